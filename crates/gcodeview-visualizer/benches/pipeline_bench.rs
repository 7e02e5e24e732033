use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gcodeview_core::ConversionOptions;
use gcodeview_visualizer::{gcode_to_json, gcode_to_obj, Simplifier};

/// Generate a print of concentric square perimeters with a zig-zag infill
fn generate_gcode(layers: usize) -> Vec<String> {
    let mut lines = vec!["G90".to_string(), "M82".to_string(), "T0".to_string()];
    let mut e = 0.0;

    for layer in 1..=layers {
        let z = layer as f64 * 0.2;
        lines.push(format!("G0 X0 Y0 Z{:.2}", z));
        lines.push(";TYPE:WALL-OUTER".to_string());
        for side in 0..40 {
            e += 0.05;
            let t = side as f64 * 0.5;
            lines.push(format!("G1 X{:.3} Y0 E{:.5}", t, e));
        }
        lines.push(";TYPE:FILL".to_string());
        for row in 0..40 {
            e += 0.2;
            let x = if row % 2 == 0 { 20.0 } else { 0.0 };
            lines.push(format!("G1 X{:.3} Y{:.3} E{:.5}", x, row as f64 * 0.5, e));
        }
    }

    lines
}

fn bench_pipeline(c: &mut Criterion) {
    let options = ConversionOptions::default();
    let mut group = c.benchmark_group("pipeline");

    for layers in [10, 100] {
        let gcode = generate_gcode(layers);

        group.bench_with_input(BenchmarkId::new("json", layers), &gcode, |b, gcode| {
            b.iter(|| gcode_to_json(black_box(gcode), &options).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("obj", layers), &gcode, |b, gcode| {
            b.iter(|| gcode_to_obj(black_box(gcode), &options).unwrap())
        });
    }

    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let gcode = generate_gcode(50);
    let options = ConversionOptions::default();
    let paths = gcodeview_visualizer::interpret_lines(&gcode, &options.filter).unwrap();
    let simplifier = Simplifier::default();

    c.bench_function("simplify_50_layers", |b| {
        b.iter(|| {
            let mut paths = black_box(paths.clone());
            simplifier.simplify_tool_paths(&mut paths);
            paths
        })
    });
}

criterion_group!(benches, bench_pipeline, bench_simplify);
criterion_main!(benches);

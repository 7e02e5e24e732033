//! Concurrent conversions through the worker pool

use gcodeview_core::{ConversionOptions, OutputFormat};
use gcodeview_visualizer::{convert, ConversionJob, ConversionPool, FileConversionJob};
use std::fs;

const SQUARE: &str = "G1 X0 Y0 Z0.2\nG1 X10 Y0 E1\nG1 X10 Y10 E2\nG1 X0 Y10 E3\nG1 X0 Y0 E4\n";

#[tokio::test]
async fn test_pool_matches_direct_conversion() {
    let pool = ConversionPool::new(2);
    let options = ConversionOptions::default();

    let json = pool
        .convert(ConversionJob::new(SQUARE, OutputFormat::Json, options.clone()))
        .await
        .unwrap();
    assert_eq!(json, convert(SQUARE, OutputFormat::Json, &options).unwrap());

    let obj = pool
        .convert(ConversionJob::new(SQUARE, OutputFormat::Obj, options.clone()))
        .await
        .unwrap();
    assert_eq!(obj, convert(SQUARE, OutputFormat::Obj, &options).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_convert_all_keeps_job_order() {
    let pool = ConversionPool::new(3);
    let jobs: Vec<ConversionJob> = (0..8)
        .map(|i| {
            let source = format!("G1 X0 Y0 Z0.2\nG1 X{} Y0 E1\n", 10 + i);
            ConversionJob::new(source, OutputFormat::Json, ConversionOptions::default())
        })
        .collect();

    let results = pool.convert_all(jobs).await;
    assert_eq!(results.len(), 8);
    for (i, result) in results.into_iter().enumerate() {
        let json = result.unwrap();
        assert!(json.contains(&format!("[{}.0,0.0]", 10 + i)), "{}", json);
    }
    assert_eq!(pool.available(), 3);
}

#[tokio::test]
async fn test_failed_job_does_not_affect_others() {
    let pool = ConversionPool::default();
    let jobs = vec![
        ConversionJob::new("G1 Xbad", OutputFormat::Obj, ConversionOptions::default()),
        ConversionJob::new(SQUARE, OutputFormat::Obj, ConversionOptions::default()),
    ];

    let results = pool.convert_all(jobs).await;
    assert!(results[0].as_ref().is_err_and(|e| e.is_gcode_error()));
    assert!(results[1].as_ref().is_ok_and(|obj| !obj.is_empty()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_convert_files_streams_into_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let pool = ConversionPool::new(2);
    let options = ConversionOptions::default();

    let mut jobs = Vec::new();
    for i in 0..5 {
        let source = format!("G1 X0 Y0 Z0.2\nG1 X{} Y0 E1\n", 10 + i);
        let input = dir.path().join(format!("part{}.gcode", i));
        fs::write(&input, &source).unwrap();
        let output = dir.path().join(format!("part{}.json", i));
        jobs.push(FileConversionJob::new(input, output, OutputFormat::Json, options.clone()));
    }
    let outputs: Vec<_> = jobs.iter().map(|job| job.output.clone()).collect();

    let results = pool.convert_files(jobs).await;
    for (i, (result, output)) in results.into_iter().zip(outputs).enumerate() {
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(result.unwrap(), written.len() as u64);
        assert!(written.contains(&format!("[{}.0,0.0]", 10 + i)), "{}", written);
    }
    assert_eq!(pool.available(), 2);
}

#[tokio::test]
async fn test_convert_files_reports_each_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.gcode");
    let bad = dir.path().join("bad.gcode");
    fs::write(&good, SQUARE).unwrap();
    fs::write(&bad, "G1 X0 Y0\nG1 Ybad E1\n").unwrap();

    let options = ConversionOptions::default();
    let jobs = vec![
        FileConversionJob::new(&bad, dir.path().join("bad.obj"), OutputFormat::Obj, options.clone()),
        FileConversionJob::new(
            dir.path().join("missing.gcode"),
            dir.path().join("missing.obj"),
            OutputFormat::Obj,
            options.clone(),
        ),
        FileConversionJob::new(&good, dir.path().join("good.obj"), OutputFormat::Obj, options.clone()),
    ];

    let results = ConversionPool::default().convert_files(jobs).await;
    assert!(results[0].as_ref().is_err_and(|e| e.to_string().contains("line 2")));
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert!(!dir.path().join("bad.obj").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("good.obj")).unwrap(),
        convert(SQUARE, OutputFormat::Obj, &options).unwrap()
    );
}

//! Bounded worker pool for running conversions off the async runtime.
//!
//! Conversions are CPU-bound, so each one runs on tokio's blocking thread
//! pool while a semaphore caps how many run at once. Dropping a returned
//! future abandons the result; the conversion itself runs to completion.

use std::path::PathBuf;
use std::sync::Arc;

use gcodeview_core::constants::DEFAULT_WORKERS;
use gcodeview_core::{ConversionOptions, Error, OutputFormat, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::convert::convert;
use crate::utils::GcodeFileReader;

/// One G-code text to render.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source: String,
    pub format: OutputFormat,
    pub options: ConversionOptions,
}

impl ConversionJob {
    pub fn new(source: impl Into<String>, format: OutputFormat, options: ConversionOptions) -> Self {
        Self {
            source: source.into(),
            format,
            options,
        }
    }
}

/// One G-code file to render into an output file.
#[derive(Debug, Clone)]
pub struct FileConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub options: ConversionOptions,
}

impl FileConversionJob {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        format: OutputFormat,
        options: ConversionOptions,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            format,
            options,
        }
    }
}

/// Caller-owned pool. Clones share the same permits.
#[derive(Debug, Clone)]
pub struct ConversionPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl Default for ConversionPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl ConversionPool {
    /// Pool running at most `workers` conversions at once (at least one).
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Workers currently idle.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `task` on the blocking pool once a worker is free.
    pub async fn run<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| Error::other(format!("conversion pool closed: {}", e)))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task()
        })
        .await
        .map_err(|e| Error::other(format!("conversion task failed: {}", e)))?
    }

    /// Render one job.
    pub async fn convert(&self, job: ConversionJob) -> Result<String> {
        debug!(
            "Queueing {} conversion of {} bytes",
            job.format,
            job.source.len()
        );
        self.run(move || convert(&job.source, job.format, &job.options))
            .await
    }

    /// Render every job concurrently. Results keep the order of `jobs`.
    pub async fn convert_all(&self, jobs: Vec<ConversionJob>) -> Vec<Result<String>> {
        let count = jobs.len();
        let mut set = JoinSet::new();
        for (index, job) in jobs.into_iter().enumerate() {
            let pool = self.clone();
            set.spawn(async move { (index, pool.convert(job).await) });
        }
        collect_ordered(set, count).await
    }

    /// Stream one file through the interpreter and write its document.
    /// Returns the number of bytes written.
    pub async fn convert_file(&self, job: FileConversionJob) -> Result<u64> {
        debug!(
            "Queueing {} conversion of {}",
            job.format,
            job.input.display()
        );
        self.run(move || {
            GcodeFileReader::new(&job.input)
                .and_then(|reader| reader.render_to_file(job.format, &job.options, &job.output))
                .map_err(|e| Error::other(format!("{:#}", e)))
        })
        .await
    }

    /// Render every file concurrently. Only the files currently held by a
    /// worker are being read. Results keep the order of `jobs`.
    pub async fn convert_files(&self, jobs: Vec<FileConversionJob>) -> Vec<Result<u64>> {
        let count = jobs.len();
        let mut set = JoinSet::new();
        for (index, job) in jobs.into_iter().enumerate() {
            let pool = self.clone();
            set.spawn(async move { (index, pool.convert_file(job).await) });
        }
        collect_ordered(set, count).await
    }
}

async fn collect_ordered<T: 'static>(
    mut set: JoinSet<(usize, Result<T>)>,
    count: usize,
) -> Vec<Result<T>> {
    let mut results: Vec<Option<Result<T>>> = (0..count).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(e) => warn!("Conversion task did not complete: {}", e),
        }
    }

    results
        .into_iter()
        .map(|result| result.unwrap_or_else(|| Err(Error::other("conversion task did not complete"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_is_at_least_one() {
        assert_eq!(ConversionPool::new(0).workers(), 1);
        assert_eq!(ConversionPool::default().workers(), DEFAULT_WORKERS);
    }

    #[tokio::test]
    async fn test_run_releases_permit() {
        let pool = ConversionPool::new(2);
        let value = pool.run(|| Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_run_propagates_errors() {
        let pool = ConversionPool::new(1);
        let err = pool
            .run(|| -> Result<()> { Err(Error::other("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_panicking_task_is_reported() {
        let pool = ConversionPool::new(1);
        let result = pool.run(|| -> Result<()> { panic!("worker panic") }).await;
        assert!(result.is_err());
        assert_eq!(pool.available(), 1);
    }
}

use crate::cache::SummaryCache;
use crate::completion::{CompletionError, CompletionService};
use crate::config::SummarizerConfig;
use crate::error::{Result, SummaryError};
use crate::prompt::{format_chunk_summaries, format_context, PromptTemplates};
use context_code_chunker::{Chunker, CodeChunk};
use context_graph::{DependencyGraph, ProcessingOrder};
use context_syntax::SourceFile;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Summary of one file together with the chunks it was built from
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub path: PathBuf,
    pub chunks: Vec<CodeChunk>,
    pub summary: String,
    /// Dependencies whose summaries were included in the prompts, in graph order
    pub context_files: Vec<PathBuf>,
}

/// Evaluation of a cached file summary against the file's code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReview {
    pub path: PathBuf,
    pub summary: String,
    pub evaluation: String,
}

/// What a pipeline run did, in processing order
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub summarized: Vec<FileSummary>,
    /// Files that were already cached when the run started
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<SummaryError>,
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_files(&self) -> Vec<&Path> {
        self.failures.iter().filter_map(SummaryError::file).collect()
    }
}

/// Summarizes files chunk by chunk, leaves first
///
/// Every chunk prompt carries the summaries of the file's direct dependencies
/// that are available when the file is reached; a second completion combines
/// the chunk summaries into the file summary.
#[derive(Clone)]
pub struct SummaryPipeline {
    chunker: Chunker,
    service: Arc<dyn CompletionService>,
    prompts: Arc<PromptTemplates>,
    completion_timeout: Duration,
}

impl std::fmt::Debug for SummaryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryPipeline")
            .field("chunker", &self.chunker)
            .field("completion_timeout", &self.completion_timeout)
            .finish_non_exhaustive()
    }
}

impl SummaryPipeline {
    pub fn new(config: &SummarizerConfig, service: Arc<dyn CompletionService>) -> Result<Self> {
        let chunker = Chunker::new(config.chunker_config())?;
        config.validate()?;

        Ok(Self {
            chunker,
            service,
            prompts: Arc::new(config.prompts.clone()),
            completion_timeout: config.completion_timeout(),
        })
    }

    /// Summarize every file in `order`, one at a time
    ///
    /// Cached files are skipped. A failing file is reported in the outcome and
    /// left uncached; the run continues with the next file.
    pub async fn run(
        &self,
        graph: &DependencyGraph,
        order: &ProcessingOrder,
        cache: &SummaryCache,
    ) -> PipelineOutcome {
        let started = Instant::now();
        let mut outcome = PipelineOutcome::default();

        for path in order {
            if cache.contains(path) {
                log::debug!("Skipping {} (cached)", path.display());
                outcome.skipped.push(path.to_path_buf());
                continue;
            }

            match self.summarize_file(path, graph, cache).await {
                Ok(summary) => {
                    cache.insert(path, summary.summary.clone());
                    outcome.summarized.push(summary);
                }
                Err(err) => {
                    log::warn!("{err}");
                    outcome.failures.push(err);
                }
            }
        }

        Self::log_outcome(&outcome, started);
        outcome
    }

    /// Summarize a single file against the summaries currently in `cache`
    ///
    /// The cache is only read; storing the result is left to the caller.
    pub async fn summarize_file(
        &self,
        path: &Path,
        graph: &DependencyGraph,
        cache: &SummaryCache,
    ) -> Result<FileSummary> {
        let context_files: Vec<PathBuf> = graph
            .dependencies(path)
            .into_iter()
            .map(Path::to_path_buf)
            .collect();
        self.summarize_with_context(path, &context_files, cache).await
    }

    /// Summarize with up to `max_in_flight` files in progress at once
    ///
    /// A file starts once every dependency placed before it in `order` is
    /// finished. Dependencies placed after it (deferred cycle edges) are never
    /// used as context, so prompts match those of [`SummaryPipeline::run`].
    pub async fn run_concurrent(
        &self,
        graph: &DependencyGraph,
        order: &ProcessingOrder,
        cache: Arc<SummaryCache>,
        max_in_flight: usize,
    ) -> PipelineOutcome {
        let started = Instant::now();
        let files = order.files();
        let position: HashMap<&Path, usize> = files
            .iter()
            .enumerate()
            .map(|(idx, path)| (path.as_path(), idx))
            .collect();

        let mut outcome = PipelineOutcome::default();
        let mut pending = vec![false; files.len()];
        for (idx, path) in files.iter().enumerate() {
            if cache.contains(path) {
                log::debug!("Skipping {} (cached)", path.display());
                outcome.skipped.push(path.clone());
            } else {
                pending[idx] = true;
            }
        }

        let mut waiting_on = vec![0usize; files.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); files.len()];
        let mut contexts: Vec<Vec<PathBuf>> = vec![Vec::new(); files.len()];
        for (idx, path) in files.iter().enumerate() {
            if !pending[idx] {
                continue;
            }
            for dependency in graph.dependencies(path) {
                let Some(&dep_idx) = position.get(dependency) else {
                    continue;
                };
                if dep_idx < idx || !pending[dep_idx] {
                    contexts[idx].push(dependency.to_path_buf());
                }
                if dep_idx < idx && pending[dep_idx] {
                    waiting_on[idx] += 1;
                    dependents[dep_idx].push(idx);
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..files.len())
            .filter(|&idx| pending[idx] && waiting_on[idx] == 0)
            .collect();
        let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut summarized = Vec::new();
        let mut failures = Vec::new();

        loop {
            while let Some(idx) = ready.pop_front() {
                let pipeline = self.clone();
                let cache = Arc::clone(&cache);
                let permits = Arc::clone(&permits);
                let path = files[idx].clone();
                let context = std::mem::take(&mut contexts[idx]);
                let handle = tasks.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return (idx, Err(SummaryError::invalid_config("permit pool closed")));
                    };
                    let result = pipeline.summarize_with_context(&path, &context, &cache).await;
                    (idx, result)
                });
                in_flight.insert(handle.id(), idx);
            }

            let Some(joined) = tasks.join_next_with_id().await else {
                break;
            };
            let (idx, result) = match joined {
                Ok((id, done)) => {
                    in_flight.remove(&id);
                    done
                }
                Err(err) => {
                    let Some(idx) = in_flight.remove(&err.id()) else {
                        log::error!("Summarization task {} aborted: {err}", err.id());
                        continue;
                    };
                    log::error!("Summarization task for {} aborted: {err}", files[idx].display());
                    (idx, Err(SummaryError::task_failed(&files[idx], err.to_string())))
                }
            };

            match result {
                Ok(summary) => {
                    cache.insert(&summary.path, summary.summary.clone());
                    summarized.push((idx, summary));
                }
                Err(err) => {
                    log::warn!("{err}");
                    failures.push((idx, err));
                }
            }
            for &dependent in &dependents[idx] {
                waiting_on[dependent] -= 1;
                if waiting_on[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }

        summarized.sort_by_key(|(idx, _)| *idx);
        failures.sort_by_key(|(idx, _)| *idx);
        outcome.summarized = summarized.into_iter().map(|(_, summary)| summary).collect();
        outcome.failures = failures.into_iter().map(|(_, err)| err).collect();

        Self::log_outcome(&outcome, started);
        outcome
    }

    /// Ask the completion service how well the cached summary of `path` fits its code
    pub async fn review_file(&self, path: &Path, cache: &SummaryCache) -> Result<SummaryReview> {
        let summary = cache
            .get(path)
            .ok_or_else(|| SummaryError::missing_summary(path))?;
        let code = SourceFile::new(path)
            .load()
            .map_err(|err| SummaryError::load(path, err))?;

        let prompt = self.prompts.review_prompt(path, &code, &summary);
        let evaluation = self.complete(path, &prompt).await?;
        log::debug!("Reviewed summary of {}", path.display());

        Ok(SummaryReview {
            path: path.to_path_buf(),
            summary,
            evaluation,
        })
    }

    async fn summarize_with_context(
        &self,
        path: &Path,
        candidates: &[PathBuf],
        cache: &SummaryCache,
    ) -> Result<FileSummary> {
        let mut context = Vec::new();
        for dependency in candidates {
            if let Some(summary) = cache.get(dependency) {
                context.push((dependency.clone(), summary));
            } else {
                log::trace!(
                    "{}: no summary yet for dependency {}",
                    path.display(),
                    dependency.display()
                );
            }
        }
        let context_files: Vec<PathBuf> = context.iter().map(|(file, _)| file.clone()).collect();

        let content = SourceFile::new(path)
            .load()
            .map_err(|err| SummaryError::load(path, err))?;
        let file_label = path.display().to_string();
        let mut chunks = self.chunker.chunk_str(&content, &file_label);
        if chunks.is_empty() {
            log::debug!("{} is empty, nothing to summarize", path.display());
            return Ok(FileSummary {
                path: path.to_path_buf(),
                chunks,
                summary: String::new(),
                context_files,
            });
        }

        let context_block = format_context(&context);
        for chunk in &mut chunks {
            let prompt = self
                .prompts
                .chunk_prompt(path, &chunk.content, &context_block);
            chunk.summary = Some(self.complete(path, &prompt).await?);
        }

        let prompt = self
            .prompts
            .combine_prompt(path, &format_chunk_summaries(&chunks));
        let summary = self.complete(path, &prompt).await?;

        log::debug!(
            "Summarized {} ({} chunk(s), {} context file(s))",
            path.display(),
            chunks.len(),
            context_files.len()
        );

        Ok(FileSummary {
            path: path.to_path_buf(),
            chunks,
            summary,
            context_files,
        })
    }

    async fn complete(&self, path: &Path, prompt: &str) -> Result<String> {
        match tokio::time::timeout(self.completion_timeout, self.service.complete(prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => Err(SummaryError::completion(path, err)),
            Err(_) => Err(SummaryError::completion(
                path,
                CompletionError::Timeout(self.completion_timeout),
            )),
        }
    }

    fn log_outcome(outcome: &PipelineOutcome, started: Instant) {
        log::info!(
            "Summarization finished in {:.2}s: {} summarized, {} cached, {} failed",
            started.elapsed().as_secs_f32(),
            outcome.summarized.len(),
            outcome.skipped.len(),
            outcome.failures.len()
        );
    }
}

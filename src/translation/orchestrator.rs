/*!
 * Concurrent fragment translation with split-on-overflow recovery.
 *
 * All fragments are dispatched at once and gathered in input order. When
 * the model rejects a fragment as too long, the fragment is halved at a
 * blank line and its halves are scheduled as child fragments of the same
 * request. The whole request is driven from one task:
 *
 * - an arena of fragment nodes records parent/child links, per-node status
 *   and results, so nesting depth is explicit and bounded
 * - in-flight calls live in a single `FuturesUnordered`
 * - the aggregate status is re-rendered from the arena on every update
 */

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::errors::{ProviderError, TranslationError};
use crate::markdown::{BLANK_LINE, split_at_blank_lines};
use crate::providers::{ApiCaller, ApiOptions, StatusCallback};

use super::concurrency::RequestThrottle;
use super::status::{TranslationStatus, render_children};

/// Default bound on how many times a fragment may be halved
pub const DEFAULT_MAX_SPLIT_DEPTH: usize = 12;

/// Outcome of a multi-fragment translation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationReport {
    /// Joined translation in input order
    pub translation: String,
    /// Number of model calls that completed, successfully or not
    pub api_calls: usize,
    /// Number of fragments that were halved after a too-long failure
    pub splits: usize,
    /// Number of fragments returned untranslated because they could not be split
    pub passthrough_fragments: usize,
}

/// One fragment in the request tree
#[derive(Debug)]
struct FragmentNode {
    text: String,
    depth: usize,
    children: Vec<usize>,
    parent: Option<usize>,
    status: TranslationStatus,
    result: Option<String>,
}

/// Arena of all fragments of one request
#[derive(Debug, Default)]
struct FragmentTree {
    nodes: Vec<FragmentNode>,
    roots: Vec<usize>,
}

impl FragmentTree {
    fn push(&mut self, text: String, parent: Option<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(FragmentNode {
            text,
            depth,
            children: Vec::new(),
            parent,
            status: TranslationStatus::Waiting,
            result: None,
        });
        id
    }

    fn add_root(&mut self, text: String) -> usize {
        let id = self.push(text, None, 0);
        self.roots.push(id);
        id
    }

    fn add_children(&mut self, parent: usize, parts: Vec<String>) -> Vec<usize> {
        let depth = self.nodes[parent].depth + 1;
        let ids: Vec<usize> = parts
            .into_iter()
            .map(|part| self.push(part, Some(parent), depth))
            .collect();
        self.nodes[parent].children = ids.clone();
        ids
    }

    fn set_status(&mut self, id: usize, status: TranslationStatus) {
        let node = &mut self.nodes[id];
        if node.status.can_transition_to(&status) {
            node.status = status;
        }
    }

    /// Record a result and resolve every ancestor whose children are all done
    fn complete(&mut self, id: usize, translation: String) {
        let mut current = id;
        let mut translation = translation;
        loop {
            let node = &mut self.nodes[current];
            node.status = TranslationStatus::done(translation.clone());
            node.result = Some(translation);

            let Some(parent) = node.parent else {
                return;
            };
            match self.joined(&self.nodes[parent].children) {
                Some(joined) => {
                    current = parent;
                    translation = joined;
                }
                None => return,
            }
        }
    }

    fn joined(&self, ids: &[usize]) -> Option<String> {
        let parts: Option<Vec<&str>> = ids
            .iter()
            .map(|id| self.nodes[*id].result.as_deref())
            .collect();
        parts.map(|parts| parts.join(BLANK_LINE))
    }

    /// Status of one node; split nodes report their children
    fn status_of(&self, id: usize) -> TranslationStatus {
        let node = &self.nodes[id];
        if node.result.is_none() && !node.children.is_empty() {
            let children: Vec<TranslationStatus> =
                node.children.iter().map(|child| self.status_of(*child)).collect();
            TranslationStatus::pending(render_children(&children))
        } else {
            node.status.clone()
        }
    }

    fn aggregate_status(&self) -> TranslationStatus {
        let roots: Vec<TranslationStatus> =
            self.roots.iter().map(|root| self.status_of(*root)).collect();
        TranslationStatus::pending(render_children(&roots))
    }
}

type CallFuture<'f> = BoxFuture<'f, (usize, Result<String, ProviderError>)>;

/// Translates a list of fragments against one caller
#[derive(Debug, Clone)]
pub struct Orchestrator<'c> {
    /// The model caller
    caller: &'c dyn ApiCaller,
    /// Limits how many calls run together
    throttle: RequestThrottle,
    /// How many times a fragment may be halved before it is passed through
    max_split_depth: usize,
}

impl<'c> Orchestrator<'c> {
    /// Create an orchestrator with no throttling and the default split depth
    pub fn new(caller: &'c dyn ApiCaller) -> Self {
        Self {
            caller,
            throttle: RequestThrottle::unbounded(),
            max_split_depth: DEFAULT_MAX_SPLIT_DEPTH,
        }
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_max_split_depth(mut self, max_split_depth: usize) -> Self {
        self.max_split_depth = max_split_depth;
        self
    }

    /// Translate all fragments and join the results with a blank line
    pub async fn translate_many(
        &self,
        fragments: Vec<String>,
        instruction: &str,
        options: &ApiOptions,
        on_status: StatusCallback<'_>,
    ) -> Result<String, TranslationError> {
        self.translate_many_with_report(fragments, instruction, options, on_status)
            .await
            .map(|report| report.translation)
    }

    /// Same as [`Orchestrator::translate_many`], with call and split counts
    pub async fn translate_many_with_report(
        &self,
        fragments: Vec<String>,
        instruction: &str,
        options: &ApiOptions,
        on_status: StatusCallback<'_>,
    ) -> Result<TranslationReport, TranslationError> {
        let tree = Mutex::new(FragmentTree::default());
        let mut report = TranslationReport::default();
        let mut in_flight: FuturesUnordered<CallFuture<'_>> = FuturesUnordered::new();

        let roots: Vec<(usize, String)> = {
            let mut tree = tree.lock();
            fragments
                .into_iter()
                .map(|text| (tree.add_root(text.clone()), text))
                .collect()
        };
        emit_aggregate(&tree, on_status);
        debug!("Dispatching {} fragments", roots.len());

        for (id, text) in roots {
            self.schedule(&tree, &mut in_flight, id, text, instruction, options, on_status);
        }

        while let Some((id, result)) = in_flight.next().await {
            report.api_calls += 1;
            match result {
                Ok(translation) => tree.lock().complete(id, translation),

                Err(e) if e.is_input_too_long() => {
                    let (text, depth) = {
                        let tree = tree.lock();
                        (tree.nodes[id].text.clone(), tree.nodes[id].depth)
                    };
                    let parts = if depth >= self.max_split_depth {
                        warn!(
                            "Fragment reached split depth {} and is still too long",
                            depth
                        );
                        None
                    } else {
                        split_at_blank_lines(&text, 0)
                    };

                    match parts {
                        Some(parts) => {
                            debug!(
                                "Fragment of {} chars too long ({}), splitting into {} parts",
                                text.len(),
                                e,
                                parts.len()
                            );
                            report.splits += 1;
                            let children = tree.lock().add_children(id, parts.clone());
                            for (child, part) in children.into_iter().zip(parts) {
                                self.schedule(
                                    &tree,
                                    &mut in_flight,
                                    child,
                                    part,
                                    instruction,
                                    options,
                                    on_status,
                                );
                            }
                        }
                        None => {
                            warn!(
                                "Fragment of {} chars cannot be split further, keeping it untranslated",
                                text.len()
                            );
                            report.passthrough_fragments += 1;
                            tree.lock().complete(id, text);
                        }
                    }
                }

                Err(e) => {
                    error!("Translation request failed: {}", e);
                    let aggregate = {
                        let mut tree = tree.lock();
                        tree.set_status(id, TranslationStatus::error(e.to_string()));
                        tree.aggregate_status()
                    };
                    on_status(aggregate);
                    return Err(TranslationError::Provider(e));
                }
            }
            emit_aggregate(&tree, on_status);
        }

        let joined = {
            let tree = tree.lock();
            tree.joined(&tree.roots)
        };
        let translation = joined.ok_or_else(|| {
            TranslationError::Aborted("Some fragments never finished".to_string())
        })?;

        on_status(TranslationStatus::done(translation.clone()));
        report.translation = translation;
        Ok(report)
    }

    /// Start one fragment, or resolve it at once if there is nothing to translate
    #[allow(clippy::too_many_arguments)]
    fn schedule<'f>(
        &'f self,
        tree: &'f Mutex<FragmentTree>,
        in_flight: &mut FuturesUnordered<CallFuture<'f>>,
        id: usize,
        text: String,
        instruction: &'f str,
        options: &'f ApiOptions,
        on_status: StatusCallback<'f>,
    ) {
        if text.trim().is_empty() {
            tree.lock().complete(id, text);
            return;
        }

        let call = async move {
            let _permit = self.throttle.acquire().await;
            let forward = |status: TranslationStatus| {
                let aggregate = {
                    let mut tree = tree.lock();
                    tree.set_status(id, status);
                    tree.aggregate_status()
                };
                on_status(aggregate);
            };
            let result = self.caller.call(&text, instruction, options, &forward).await;
            (id, result)
        };
        in_flight.push(call.boxed());
    }
}

/// Translate `fragments` with an unthrottled orchestrator
pub async fn translate_many(
    caller: &dyn ApiCaller,
    fragments: Vec<String>,
    instruction: &str,
    options: &ApiOptions,
    on_status: StatusCallback<'_>,
) -> Result<String, TranslationError> {
    Orchestrator::new(caller)
        .translate_many(fragments, instruction, options, on_status)
        .await
}

/// Report the current aggregate, with the arena unlocked while the callback runs
fn emit_aggregate(tree: &Mutex<FragmentTree>, on_status: StatusCallback<'_>) {
    let aggregate = tree.lock().aggregate_status();
    on_status(aggregate);
}

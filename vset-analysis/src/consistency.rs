//! Cross-checks a consumer's validator-set changelog against the provider's.
//!
//! Every consumer event at or after the provider epoch is classified as
//! consistent, missing (the set never appeared on the provider),
//! not-yet-existed (the provider only reached it at or after the consumer did)
//! or out-of-order (its predecessor set was not active on the provider before
//! it).

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::ValidatorSetChangeEvent;

/// How the ordering check treats a hash that does not occur in the scanned
/// provider prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// A hash that is not found counts as position 0, and a match at position
    /// 0 may be overtaken by a later match. An event whose predecessor is
    /// unknown to the provider prefix is therefore in-order whenever its own
    /// set appears past the first provider event.
    #[default]
    SentinelZero,
    /// Both hashes must be found in the prefix, predecessor first.
    NotFoundIsOutOfOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Consistent,
    Missing,
    NotYetExisted,
    OutOfOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Consumer events older than the provider epoch.
    pub excluded: usize,
    pub consistent: usize,
    pub missing: Vec<ValidatorSetChangeEvent>,
    pub not_yet_existed: Vec<ValidatorSetChangeEvent>,
    pub out_of_order: Vec<ValidatorSetChangeEvent>,
}

impl ConsistencyReport {
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    pub fn not_yet_existed_count(&self) -> usize {
        self.not_yet_existed.len()
    }

    pub fn out_of_order_count(&self) -> usize {
        self.out_of_order.len()
    }

    pub fn analysed(&self) -> usize {
        self.consistent
            + self.missing_count()
            + self.not_yet_existed_count()
            + self.out_of_order_count()
    }

    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.not_yet_existed.is_empty() && self.out_of_order.is_empty()
    }
}

pub struct ConsistencyChecker<'a> {
    provider: &'a [ValidatorSetChangeEvent],
    index: HashMap<&'a str, &'a ValidatorSetChangeEvent>,
    policy: OrderingPolicy,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(provider: &'a [ValidatorSetChangeEvent]) -> Self {
        let mut index = HashMap::new();
        for event in provider {
            index.entry(event.content_hash.as_str()).or_insert(event);
        }
        Self {
            provider,
            index,
            policy: OrderingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Timestamp of the provider's first event; nothing earlier can be judged.
    pub fn epoch(&self) -> Option<DateTime<Utc>> {
        self.provider.first().map(|event| event.timestamp)
    }

    /// First provider event carrying `content_hash`.
    pub fn provider_event(&self, content_hash: &str) -> Option<&'a ValidatorSetChangeEvent> {
        self.index.get(content_hash).copied()
    }

    /// `None` when the event predates the provider epoch.
    pub fn classify(&self, event: &ValidatorSetChangeEvent) -> Option<Classification> {
        if let Some(epoch) = self.epoch() {
            if event.timestamp < epoch {
                return None;
            }
        }

        if !self.index.contains_key(event.content_hash.as_str()) {
            return Some(Classification::Missing);
        }
        if !self.exists_before(&event.content_hash, event.timestamp) {
            return Some(Classification::NotYetExisted);
        }
        if !self.is_in_order(event) {
            return Some(Classification::OutOfOrder);
        }
        Some(Classification::Consistent)
    }

    pub fn check(&self, consumer: &[ValidatorSetChangeEvent]) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        for event in consumer {
            match self.classify(event) {
                None => report.excluded += 1,
                Some(Classification::Consistent) => report.consistent += 1,
                Some(Classification::Missing) => {
                    log::info!(
                        "[missing] Found consumer validator hash {} at block {}, missing from provider",
                        event.validators_hash,
                        event.height
                    );
                    report.missing.push(event.clone());
                }
                Some(Classification::NotYetExisted) => {
                    log::info!(
                        "[not existed] Found consumer validator hash {} at block {}, not existed on provider at that time",
                        event.validators_hash,
                        event.height
                    );
                    report.not_yet_existed.push(event.clone());
                }
                Some(Classification::OutOfOrder) => {
                    log::info!(
                        "[out of order] Found consumer validator hash {}, old validator hash {} at block {}",
                        event.validators_hash,
                        event.previous_validators_hash,
                        event.height
                    );
                    report.out_of_order.push(event.clone());
                }
            }
        }
        report
    }

    fn exists_before(&self, content_hash: &str, timestamp: DateTime<Utc>) -> bool {
        self.provider
            .iter()
            .any(|p| p.content_hash == content_hash && p.timestamp < timestamp)
    }

    fn is_in_order(&self, event: &ValidatorSetChangeEvent) -> bool {
        if event.previous_content_hash.is_empty() {
            return true;
        }

        let prefix = self
            .provider
            .iter()
            .take_while(|p| p.timestamp <= event.timestamp);

        match self.policy {
            OrderingPolicy::SentinelZero => {
                let mut current = 0;
                let mut previous = 0;
                for (i, p) in prefix.enumerate() {
                    if current == 0 && p.content_hash == event.content_hash {
                        current = i;
                    }
                    if previous == 0 && p.content_hash == event.previous_content_hash {
                        previous = i;
                    }
                }
                previous < current
            }
            OrderingPolicy::NotFoundIsOutOfOrder => {
                let mut current = None;
                let mut previous = None;
                for (i, p) in prefix.enumerate() {
                    if current.is_none() && p.content_hash == event.content_hash {
                        current = Some(i);
                    }
                    if previous.is_none() && p.content_hash == event.previous_content_hash {
                        previous = Some(i);
                    }
                }
                matches!((previous, current), (Some(p), Some(c)) if p < c)
            }
        }
    }
}

pub fn check_consistency(
    provider: &[ValidatorSetChangeEvent],
    consumer: &[ValidatorSetChangeEvent],
) -> ConsistencyReport {
    ConsistencyChecker::new(provider).check(consumer)
}

//! Fanout hub implementation
//!
//! The central per-process hub that owns all connection and topic state,
//! formats events, and delivers them to subscribers.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::topic::parse_topic_header;

use super::config::HubConfig;
use super::connection::{ConnectionEntry, ConnectionId, EventSink, PayloadSource, Subscription};
use super::error::HubError;
use super::event;
use super::paging::{self, Page, PageParams};
use super::tail::{TailBuffer, TailEvent};

/// Per-topic state
///
/// An entry exists only while the topic has at least one subscriber;
/// removing the last subscriber deletes the entry and its replay ring.
#[derive(Debug)]
struct TopicEntry {
    subscribers: HashSet<ConnectionId>,
    tail: TailBuffer,
}

impl TopicEntry {
    fn new(tail_capacity: usize) -> Self {
        Self {
            subscribers: HashSet::new(),
            tail: TailBuffer::new(tail_capacity),
        }
    }
}

/// Mutable hub state
///
/// The connection/topic cross-reference is two independent maps keyed by
/// string ids, always updated together under the hub mutex.
#[derive(Debug, Default)]
struct HubState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    topics: HashMap<String, TopicEntry>,
}

/// Outcome status of a publish call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// The event was formatted and delivery was attempted
    Accepted,
    /// No requested topic had a subscriber; the payload was never read
    Dropped,
}

/// Result of a publish call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub status: PublishStatus,
    pub id: String,
    /// Number of connections the event was enqueued to; absent on drop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered: Option<u64>,
    /// Requested topics that had no subscribers
    pub dropped_topics: Vec<String>,
}

impl PublishReceipt {
    fn accepted(id: String, delivered: u64, dropped_topics: Vec<String>) -> Self {
        Self {
            status: PublishStatus::Accepted,
            id,
            delivered: Some(delivered),
            dropped_topics,
        }
    }

    fn dropped(id: String, dropped_topics: Vec<String>) -> Self {
        Self {
            status: PublishStatus::Dropped,
            id,
            delivered: None,
            dropped_topics,
        }
    }
}

/// One row of a topic listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub topic: String,
    pub connection_count: usize,
}

/// One row of a connection listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub connection_id: String,
    pub topics: Vec<String>,
}

/// Result of a tail query
#[derive(Debug, Clone, Serialize)]
pub struct TopicTail {
    pub topic: String,
    pub events: Vec<TailEvent>,
}

/// Counters exposed for observability and tests
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubMetrics {
    /// Number of publish calls that actually read their payload
    pub body_read_count: u64,
}

/// Point-in-time view of hub occupancy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubSnapshot {
    pub connection_count: usize,
    pub topic_counts: HashMap<String, usize>,
}

/// Per-process fanout hub
///
/// Owns every connection and topic registered on this process. All
/// operations serialize on one mutex, so no operation ever observes a
/// torn intermediate state of the two maps. Subscriber sinks may fail at
/// any time; a failed sink degrades to an unregister of that connection
/// and never fails the operation that discovered it.
#[derive(Debug)]
pub struct FanoutHub {
    config: HubConfig,
    state: Mutex<HubState>,
    body_reads: AtomicU64,
}

impl FanoutHub {
    /// Create a hub with default configuration
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    /// Create a hub with custom configuration
    pub fn with_config(config: HubConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HubState::default()),
            body_reads: AtomicU64::new(0),
        }
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Open a subscriber stream
    ///
    /// Validates the raw topic list, resolves the connection id (the
    /// provided one when non-blank, else a fresh v4 uuid), and registers
    /// the connection against every topic, creating topic entries as
    /// needed. Re-using a live connection id fully unregisters the prior
    /// registration first. The returned subscription already has the
    /// acknowledgement comment frame queued.
    pub async fn subscribe(
        &self,
        raw_topics: Option<&str>,
        connection_id: Option<&str>,
    ) -> Result<Subscription, HubError> {
        let topics = parse_topic_header(raw_topics)?;

        let connection_id = match connection_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let (sink, frames) = EventSink::channel();

        let mut state = self.state.lock().await;

        if state.connections.contains_key(&connection_id) {
            Self::remove_connection(&mut state, &connection_id);
            tracing::debug!(connection_id = %connection_id, "Replaced live registration");
        }

        state.connections.insert(
            connection_id.clone(),
            ConnectionEntry {
                topics: topics.clone(),
                sink: sink.clone(),
            },
        );

        for topic in &topics {
            let entry = state
                .topics
                .entry(topic.clone())
                .or_insert_with(|| TopicEntry::new(self.config.tail_buffer_size));
            entry.subscribers.insert(connection_id.clone());
        }

        // The receiver is still held by this call, so the send cannot fail.
        let _ = sink.send(event::ack_frame(&connection_id));

        tracing::info!(
            connection_id = %connection_id,
            topics = topics.len(),
            "Subscriber registered"
        );

        Ok(Subscription::new(connection_id, frames))
    }

    /// Publish an event to one or more topics
    ///
    /// Requested topics are partitioned into active (subscriber count > 0)
    /// and dropped. When no topic is active the payload source is never
    /// read. Otherwise the payload is read exactly once, appended to each
    /// active topic's replay ring, and the formatted frame is delivered to
    /// the de-duplicated union of subscribers across the active topics. A
    /// failed sink unregisters that connection and delivery continues.
    pub async fn publish(
        &self,
        raw_topics: Option<&str>,
        event_id: Option<&str>,
        payload: PayloadSource,
    ) -> Result<PublishReceipt, HubError> {
        let event_id = event_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(HubError::MissingEventId)?
            .to_string();
        let topics = parse_topic_header(raw_topics)?;

        let mut state = self.state.lock().await;

        let mut active = Vec::new();
        let mut dropped = Vec::new();
        for topic in topics {
            match state.topics.get(&topic) {
                Some(entry) if !entry.subscribers.is_empty() => active.push(topic),
                _ => dropped.push(topic),
            }
        }

        if active.is_empty() {
            for topic in &dropped {
                tracing::debug!(topic = %topic, id = %event_id, "Publish dropped: no subscribers");
            }

            return Ok(PublishReceipt::dropped(event_id, dropped));
        }

        self.body_reads.fetch_add(1, Ordering::Relaxed);
        let payload = payload.read().await.map_err(HubError::PayloadRead)?;
        let frame = event::format_event(&event_id, &payload);

        let mut targets: HashSet<ConnectionId> = HashSet::new();
        for topic in &active {
            if let Some(entry) = state.topics.get_mut(topic) {
                targets.extend(entry.subscribers.iter().cloned());
                entry.tail.push(TailEvent {
                    id: event_id.clone(),
                    payload: payload.clone(),
                });
            }
        }

        let mut delivered = 0u64;
        let mut failed = Vec::new();
        for connection_id in &targets {
            if let Some(connection) = state.connections.get(connection_id) {
                if connection.sink.send(frame.clone()).is_ok() {
                    delivered += 1;
                } else {
                    failed.push(connection_id.clone());
                }
            }
        }

        for connection_id in failed {
            tracing::warn!(
                connection_id = %connection_id,
                "Delivery failed, unregistering connection"
            );
            Self::remove_connection(&mut state, &connection_id);
        }

        tracing::debug!(
            id = %event_id,
            delivered = delivered,
            active_topics = active.len(),
            "Event published"
        );

        Ok(PublishReceipt::accepted(event_id, delivered, dropped))
    }

    /// List topics sorted by name, one page at a time
    pub async fn list_topics(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Page<TopicSummary> {
        let params = PageParams::parse(page, page_size, &self.config);
        let state = self.state.lock().await;

        let mut records: Vec<TopicSummary> = state
            .topics
            .iter()
            .map(|(topic, entry)| TopicSummary {
                topic: topic.clone(),
                connection_count: entry.subscribers.len(),
            })
            .collect();
        records.sort_by(|left, right| left.topic.cmp(&right.topic));

        paging::paginate(records, params)
    }

    /// List connections sorted by id, one page at a time
    pub async fn list_connections(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Page<ConnectionSummary> {
        let params = PageParams::parse(page, page_size, &self.config);
        let state = self.state.lock().await;

        let mut records: Vec<ConnectionSummary> = state
            .connections
            .iter()
            .map(|(connection_id, entry)| ConnectionSummary {
                connection_id: connection_id.clone(),
                topics: entry.topics.clone(),
            })
            .collect();
        records.sort_by(|left, right| left.connection_id.cmp(&right.connection_id));

        paging::paginate(records, params)
    }

    /// Read back up to `limit` recent events for a topic
    ///
    /// Read-only; an unknown topic yields an empty list.
    pub async fn tail_events(&self, topic: &str, limit: Option<&str>) -> TopicTail {
        let limit = paging::parse_positive(limit, self.config.default_tail_limit)
            .min(self.config.max_tail_limit);
        let state = self.state.lock().await;

        let events = state
            .topics
            .get(topic)
            .map(|entry| entry.tail.recent(limit as usize))
            .unwrap_or_default();

        TopicTail {
            topic: topic.to_string(),
            events,
        }
    }

    /// Unregister a connection
    ///
    /// Removes it from every subscribed topic; a topic whose subscriber
    /// set becomes empty is deleted together with its replay ring.
    /// Unknown ids are a no-op.
    pub async fn unregister(&self, connection_id: &str) {
        let mut state = self.state.lock().await;
        Self::remove_connection(&mut state, connection_id);
    }

    /// Get observability counters
    pub fn metrics(&self) -> HubMetrics {
        HubMetrics {
            body_read_count: self.body_reads.load(Ordering::Relaxed),
        }
    }

    /// Get a point-in-time occupancy snapshot
    pub async fn snapshot(&self) -> HubSnapshot {
        let state = self.state.lock().await;

        let topic_counts = state
            .topics
            .iter()
            .map(|(topic, entry)| (topic.clone(), entry.subscribers.len()))
            .collect();

        HubSnapshot {
            connection_count: state.connections.len(),
            topic_counts,
        }
    }

    fn remove_connection(state: &mut HubState, connection_id: &str) {
        let connection = match state.connections.remove(connection_id) {
            Some(connection) => connection,
            None => return,
        };

        for topic in &connection.topics {
            let now_empty = match state.topics.get_mut(topic) {
                Some(entry) => {
                    entry.subscribers.remove(connection_id);
                    entry.subscribers.is_empty()
                }
                None => false,
            };

            if now_empty {
                state.topics.remove(topic);
                tracing::debug!(topic = %topic, "Topic removed: last subscriber left");
            }
        }

        tracing::info!(connection_id = %connection_id, "Subscriber unregistered");
    }
}

impl Default for FanoutHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counted_payload(reads: &Arc<AtomicUsize>, payload: &str) -> PayloadSource {
        let reads = Arc::clone(reads);
        let payload = payload.to_string();
        PayloadSource::from_fn(move || async move {
            reads.fetch_add(1, Ordering::SeqCst);
            Ok(payload)
        })
    }

    #[tokio::test]
    async fn test_subscribe_queues_ack_frame() {
        let hub = FanoutHub::new();

        let mut subscription = hub.subscribe(Some("alerts"), Some("conn-1")).await.unwrap();
        assert_eq!(subscription.connection_id, "conn-1");

        let ack = subscription.try_recv().unwrap();
        assert_eq!(&ack[..], b": connected conn-1\n\n");
    }

    #[tokio::test]
    async fn test_subscribe_generates_id_when_absent() {
        let hub = FanoutHub::new();

        let blank = hub.subscribe(Some("alerts"), Some("  ")).await.unwrap();
        assert!(!blank.connection_id.is_empty());
        assert_ne!(blank.connection_id, "  ");

        let generated = hub.subscribe(Some("alerts"), None).await.unwrap();
        assert_ne!(generated.connection_id, blank.connection_id);
    }

    #[tokio::test]
    async fn test_subscribe_rejects_invalid_topics() {
        let hub = FanoutHub::new();

        assert!(matches!(
            hub.subscribe(None, None).await,
            Err(HubError::Topic(_))
        ));
        assert!(matches!(
            hub.subscribe(Some("alerts,,metrics"), None).await,
            Err(HubError::Topic(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_never_reads_payload() {
        let hub = FanoutHub::new();
        let reads = Arc::new(AtomicUsize::new(0));

        let receipt = hub
            .publish(
                Some("alerts"),
                Some("evt-1"),
                counted_payload(&reads, "never"),
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, PublishStatus::Dropped);
        assert_eq!(receipt.id, "evt-1");
        assert_eq!(receipt.delivered, None);
        assert_eq!(receipt.dropped_topics, vec!["alerts"]);
        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert_eq!(hub.metrics().body_read_count, 0);
    }

    #[tokio::test]
    async fn test_publish_reads_payload_once_and_delivers_union() {
        let hub = FanoutHub::new();
        let reads = Arc::new(AtomicUsize::new(0));

        // conn-1 matches both active topics; it must receive the event once.
        let mut first = hub
            .subscribe(Some("alerts,metrics"), Some("conn-1"))
            .await
            .unwrap();
        let mut second = hub.subscribe(Some("alerts"), Some("conn-2")).await.unwrap();
        first.try_recv().unwrap();
        second.try_recv().unwrap();

        let receipt = hub
            .publish(
                Some("alerts,metrics,idle"),
                Some("evt-1"),
                counted_payload(&reads, "hello"),
            )
            .await
            .unwrap();

        assert_eq!(receipt.status, PublishStatus::Accepted);
        assert_eq!(receipt.delivered, Some(2));
        assert_eq!(receipt.dropped_topics, vec!["idle"]);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(hub.metrics().body_read_count, 1);

        let expected = b"id: evt-1\ndata: hello\n\n";
        assert_eq!(&first.try_recv().unwrap()[..], expected);
        assert!(first.try_recv().is_none());
        assert_eq!(&second.try_recv().unwrap()[..], expected);
    }

    #[tokio::test]
    async fn test_publish_requires_event_id() {
        let hub = FanoutHub::new();

        let result = hub
            .publish(Some("alerts"), Some(" "), PayloadSource::text("x"))
            .await;
        assert!(matches!(result, Err(HubError::MissingEventId)));

        let result = hub
            .publish(Some("alerts"), None, PayloadSource::text("x"))
            .await;
        assert!(matches!(result, Err(HubError::MissingEventId)));
    }

    #[tokio::test]
    async fn test_failed_sink_is_isolated_and_unregistered() {
        let hub = FanoutHub::new();

        let gone = hub.subscribe(Some("alerts"), Some("conn-gone")).await.unwrap();
        let mut live = hub.subscribe(Some("alerts"), Some("conn-live")).await.unwrap();
        live.try_recv().unwrap();
        drop(gone);

        let receipt = hub
            .publish(Some("alerts"), Some("evt-1"), PayloadSource::text("hello"))
            .await
            .unwrap();

        assert_eq!(receipt.status, PublishStatus::Accepted);
        assert_eq!(receipt.delivered, Some(1));
        assert_eq!(&live.try_recv().unwrap()[..], b"id: evt-1\ndata: hello\n\n");

        let snapshot = hub.snapshot().await;
        assert_eq!(snapshot.connection_count, 1);
        assert_eq!(snapshot.topic_counts.get("alerts"), Some(&1));
    }

    #[tokio::test]
    async fn test_unregister_prunes_empty_topics() {
        let hub = FanoutHub::new();

        let subscription = hub.subscribe(Some("alerts"), Some("conn-1")).await.unwrap();
        hub.publish(Some("alerts"), Some("evt-1"), PayloadSource::text("x"))
            .await
            .unwrap();

        hub.unregister(&subscription.connection_id).await;

        let topics = hub.list_topics(None, None).await;
        assert_eq!(topics.total, 0);

        // The replay ring went away with the topic.
        let tail = hub.tail_events("alerts", None).await;
        assert!(tail.events.is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_with_same_id_replaces_memberships() {
        let hub = FanoutHub::new();

        let _old = hub.subscribe(Some("alerts"), Some("conn-1")).await.unwrap();
        let mut new = hub.subscribe(Some("metrics"), Some("conn-1")).await.unwrap();
        new.try_recv().unwrap();

        let topics = hub.list_topics(None, None).await;
        let names: Vec<_> = topics.data.iter().map(|row| row.topic.clone()).collect();
        assert_eq!(names, vec!["metrics"]);

        // No stale unreachable subscriber left behind on the old topic.
        let receipt = hub
            .publish(Some("alerts"), Some("evt-1"), PayloadSource::text("x"))
            .await
            .unwrap();
        assert_eq!(receipt.status, PublishStatus::Dropped);

        let receipt = hub
            .publish(Some("metrics"), Some("evt-2"), PayloadSource::text("y"))
            .await
            .unwrap();
        assert_eq!(receipt.delivered, Some(1));
        assert_eq!(&new.try_recv().unwrap()[..], b"id: evt-2\ndata: y\n\n");
    }

    #[tokio::test]
    async fn test_listings_sorted_and_paged() {
        let hub = FanoutHub::new();

        // Insert out of order; listings must sort by key.
        let _c = hub.subscribe(Some("zeta"), Some("conn-c")).await.unwrap();
        let _a = hub.subscribe(Some("alpha"), Some("conn-a")).await.unwrap();
        let _b = hub.subscribe(Some("alpha,zeta"), Some("conn-b")).await.unwrap();

        let connections = hub.list_connections(Some("1"), Some("2")).await;
        assert_eq!(connections.total, 3);
        assert_eq!(connections.page_size, 2);
        let ids: Vec<_> = connections
            .data
            .iter()
            .map(|row| row.connection_id.clone())
            .collect();
        assert_eq!(ids, vec!["conn-a", "conn-b"]);

        let clamped = hub.list_connections(Some("1"), Some("800")).await;
        assert_eq!(clamped.page_size, 500);

        let topics = hub.list_topics(None, None).await;
        let names: Vec<_> = topics.data.iter().map(|row| row.topic.clone()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(topics.data[0].connection_count, 2);
        assert_eq!(topics.data[1].connection_count, 2);
    }

    #[tokio::test]
    async fn test_tail_events_clamped_in_insertion_order() {
        let config = HubConfig::default().tail_buffer_size(3);
        let hub = FanoutHub::with_config(config);

        let _sub = hub.subscribe(Some("alerts"), Some("conn-1")).await.unwrap();
        for index in 0..5 {
            let event_id = format!("evt-{}", index);
            hub.publish(
                Some("alerts"),
                Some(event_id.as_str()),
                PayloadSource::text(format!("payload-{}", index)),
            )
            .await
            .unwrap();
        }

        // Ring capacity 3 keeps evt-2..evt-4; limit 2 keeps the most recent.
        let tail = hub.tail_events("alerts", Some("2")).await;
        let ids: Vec<_> = tail.events.iter().map(|event| event.id.clone()).collect();
        assert_eq!(ids, vec!["evt-3", "evt-4"]);

        let unknown = hub.tail_events("missing", None).await;
        assert_eq!(unknown.topic, "missing");
        assert!(unknown.events.is_empty());
    }

    #[tokio::test]
    async fn test_publish_receipt_wire_shape() {
        let hub = FanoutHub::new();

        let receipt = hub
            .publish(Some("idle"), Some("evt-1"), PayloadSource::text("x"))
            .await
            .unwrap();

        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "status": "dropped",
                "id": "evt-1",
                "droppedTopics": ["idle"],
            })
        );
    }
}

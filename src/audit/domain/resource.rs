use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum length for resource identifiers (ARNs and queue URLs fit comfortably)
const MAX_RESOURCE_ID_LENGTH: usize = 2048;

/// Kind of cloud resource covered by the audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Instance,
    Volume,
    Queue,
    Topic,
    Subscription,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Volume => "volume",
            ResourceKind::Queue => "queue",
            ResourceKind::Topic => "topic",
            ResourceKind::Subscription => "subscription",
        }
    }

    /// Service-qualified label used in report rows
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "EC2 Instance",
            ResourceKind::Volume => "EBS Volume",
            ResourceKind::Queue => "SQS Queue",
            ResourceKind::Topic => "SNS Topic",
            ResourceKind::Subscription => "SNS Subscription",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instance" => Ok(ResourceKind::Instance),
            "volume" => Ok(ResourceKind::Volume),
            "queue" => Ok(ResourceKind::Queue),
            "topic" => Ok(ResourceKind::Topic),
            "subscription" => Ok(ResourceKind::Subscription),
            _ => Err(format!(
                "Unknown resource kind: '{}'. Expected one of: instance, volume, queue, topic, subscription",
                s
            )),
        }
    }
}

/// EBS block device attached to an instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDevice {
    pub device_name: String,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default)]
    pub size_gb: Option<u64>,
}

/// EC2 instance attributes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceAttributes {
    pub instance_type: String,
    /// CPU credit specification for burstable families ("standard" / "unlimited")
    #[serde(default)]
    pub cpu_credits: Option<String>,
    #[serde(default)]
    pub block_device_mappings: Vec<BlockDevice>,
    #[serde(default)]
    pub launch_time: Option<DateTime<Utc>>,
}

impl InstanceAttributes {
    /// Instance family, e.g. `t2` for `t2.micro`
    pub fn family(&self) -> &str {
        self.instance_type
            .split('.')
            .next()
            .unwrap_or(&self.instance_type)
    }

    /// Instance size, e.g. `micro` for `t2.micro`
    pub fn size(&self) -> Option<&str> {
        self.instance_type.split_once('.').map(|(_, size)| size)
    }

    pub fn has_unlimited_credits(&self) -> bool {
        self.cpu_credits
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("unlimited"))
    }

    /// Block devices backed by an EBS volume
    pub fn ebs_volumes(&self) -> impl Iterator<Item = &BlockDevice> {
        self.block_device_mappings
            .iter()
            .filter(|device| device.volume_id.is_some())
    }
}

/// EBS volume attributes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VolumeAttributes {
    pub volume_type: String,
    pub size_gb: u64,
    #[serde(default)]
    pub attached_instance_id: Option<String>,
}

/// Parsed SQS redrive policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RedrivePolicy {
    #[serde(rename = "deadLetterTargetArn")]
    pub dead_letter_target_arn: String,
    #[serde(rename = "maxReceiveCount", deserialize_with = "lenient::u64_required")]
    pub max_receive_count: u64,
}

/// SQS queue attributes, keyed by the attribute names the SQS API returns
///
/// Numeric and boolean attributes accept either native JSON values or the
/// string encoding used by `GetQueueAttributes`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueAttributes {
    #[serde(default)]
    pub queue_arn: Option<String>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub approximate_number_of_messages: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub approximate_number_of_messages_not_visible: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub approximate_number_of_messages_delayed: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub visibility_timeout: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub message_retention_period: Option<u64>,
    #[serde(default, deserialize_with = "lenient::u64_opt")]
    pub receive_message_wait_time_seconds: Option<u64>,
    #[serde(default, deserialize_with = "lenient::redrive_policy")]
    pub redrive_policy: Option<RedrivePolicy>,
    #[serde(default)]
    pub kms_master_key_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool_opt")]
    pub fifo_queue: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool_opt")]
    pub content_based_deduplication: Option<bool>,
    /// Epoch seconds
    #[serde(default, deserialize_with = "lenient::i64_opt")]
    pub last_modified_timestamp: Option<i64>,
}

impl QueueAttributes {
    pub fn visible_messages(&self) -> u64 {
        self.approximate_number_of_messages.unwrap_or(0)
    }

    /// Visible + in-flight + delayed messages
    pub fn total_messages(&self) -> u64 {
        self.visible_messages()
            .saturating_add(self.approximate_number_of_messages_not_visible.unwrap_or(0))
            .saturating_add(self.approximate_number_of_messages_delayed.unwrap_or(0))
    }

    pub fn has_kms_key(&self) -> bool {
        self.kms_master_key_id
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified_timestamp
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// SNS topic attributes
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicAttributes {
    #[serde(default)]
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub kms_master_key_id: Option<String>,
}

impl TopicAttributes {
    pub fn has_kms_key(&self) -> bool {
        self.kms_master_key_id
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// SNS subscription attributes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionAttributes {
    #[serde(default)]
    pub subscription_arn: Option<String>,
    pub topic_arn: String,
    pub protocol: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Raw filter policy; SNS returns it as a JSON-encoded string
    #[serde(default)]
    pub filter_policy: Option<serde_json::Value>,
}

impl SubscriptionAttributes {
    pub fn has_filter_policy(&self) -> bool {
        match &self.filter_policy {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::String(s)) => {
                let trimmed = s.trim();
                !trimmed.is_empty() && trimmed != "{}"
            }
            Some(serde_json::Value::Object(map)) => !map.is_empty(),
            Some(_) => true,
        }
    }
}

/// Kind-specific attributes of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAttributes {
    Instance(InstanceAttributes),
    Volume(VolumeAttributes),
    Queue(QueueAttributes),
    Topic(TopicAttributes),
    Subscription(SubscriptionAttributes),
}

impl ResourceAttributes {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceAttributes::Instance(_) => ResourceKind::Instance,
            ResourceAttributes::Volume(_) => ResourceKind::Volume,
            ResourceAttributes::Queue(_) => ResourceKind::Queue,
            ResourceAttributes::Topic(_) => ResourceKind::Topic,
            ResourceAttributes::Subscription(_) => ResourceKind::Subscription,
        }
    }

    /// Decodes raw attribute JSON for the given kind
    ///
    /// # Errors
    /// Returns an error if the attributes do not match the kind's schema
    pub fn from_json(kind: ResourceKind, raw: serde_json::Value) -> Result<Self> {
        let raw = if raw.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            raw
        };
        let attributes = match kind {
            ResourceKind::Instance => ResourceAttributes::Instance(serde_json::from_value(raw)?),
            ResourceKind::Volume => ResourceAttributes::Volume(serde_json::from_value(raw)?),
            ResourceKind::Queue => ResourceAttributes::Queue(serde_json::from_value(raw)?),
            ResourceKind::Topic => ResourceAttributes::Topic(serde_json::from_value(raw)?),
            ResourceKind::Subscription => {
                ResourceAttributes::Subscription(serde_json::from_value(raw)?)
            }
        };
        Ok(attributes)
    }
}

/// A single cloud resource as captured in the inventory snapshot
///
/// Immutable once constructed; checks only ever borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    id: String,
    state: String,
    tags: BTreeMap<String, String>,
    attributes: ResourceAttributes,
}

impl ResourceRecord {
    pub fn new(
        id: String,
        state: String,
        tags: BTreeMap<String, String>,
        attributes: ResourceAttributes,
    ) -> Result<Self> {
        if id.trim().is_empty() {
            anyhow::bail!("Resource id cannot be empty");
        }
        if id.len() > MAX_RESOURCE_ID_LENGTH {
            anyhow::bail!(
                "Resource id is too long ({} bytes). Maximum allowed: {} bytes",
                id.len(),
                MAX_RESOURCE_ID_LENGTH
            );
        }

        Ok(Self {
            id,
            state,
            tags,
            attributes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.attributes.kind()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &ResourceAttributes {
        &self.attributes
    }

    pub fn is_in_state(&self, state: &str) -> bool {
        self.state.eq_ignore_ascii_case(state)
    }

    /// Human-friendly name
    ///
    /// Queues use the last path segment of their URL, topics the last ARN
    /// segment, everything else the `Name` tag when present.
    pub fn display_name(&self) -> &str {
        match self.kind() {
            ResourceKind::Queue => self.id.rsplit('/').next().unwrap_or(&self.id),
            ResourceKind::Topic => self.id.rsplit(':').next().unwrap_or(&self.id),
            _ => self.tag("Name").unwrap_or(&self.id),
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceAttributes> {
        match &self.attributes {
            ResourceAttributes::Instance(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_volume(&self) -> Option<&VolumeAttributes> {
        match &self.attributes {
            ResourceAttributes::Volume(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_queue(&self) -> Option<&QueueAttributes> {
        match &self.attributes {
            ResourceAttributes::Queue(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_topic(&self) -> Option<&TopicAttributes> {
        match &self.attributes {
            ResourceAttributes::Topic(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn as_subscription(&self) -> Option<&SubscriptionAttributes> {
        match &self.attributes {
            ResourceAttributes::Subscription(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Deserializers that accept both native JSON values and the string
/// encodings AWS APIs return for queue attributes.
mod lenient {
    use super::RedrivePolicy;
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum UnsignedOrText {
        Number(u64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SignedOrText {
        Number(i64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagOrText {
        Flag(bool),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRedrive {
        Object(RedrivePolicy),
        Encoded(String),
    }

    pub fn u64_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        match Option::<UnsignedOrText>::deserialize(d)? {
            None => Ok(None),
            Some(UnsignedOrText::Number(n)) => Ok(Some(n)),
            Some(UnsignedOrText::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(UnsignedOrText::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| {
                    de::Error::custom(format!("expected an unsigned integer, got '{}'", s))
                }),
        }
    }

    pub fn u64_required<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        u64_opt(d)?.ok_or_else(|| de::Error::custom("expected an unsigned integer"))
    }

    pub fn i64_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match Option::<SignedOrText>::deserialize(d)? {
            None => Ok(None),
            Some(SignedOrText::Number(n)) => Ok(Some(n)),
            Some(SignedOrText::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(SignedOrText::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("expected an integer, got '{}'", s))),
        }
    }

    pub fn bool_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        match Option::<FlagOrText>::deserialize(d)? {
            None => Ok(None),
            Some(FlagOrText::Flag(b)) => Ok(Some(b)),
            Some(FlagOrText::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                "" => Ok(None),
                _ => Err(de::Error::custom(format!("expected 'true' or 'false', got '{}'", s))),
            },
        }
    }

    pub fn redrive_policy<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<RedrivePolicy>, D::Error> {
        match Option::<RawRedrive>::deserialize(d)? {
            None => Ok(None),
            Some(RawRedrive::Object(policy)) => Ok(Some(policy)),
            Some(RawRedrive::Encoded(s)) if s.trim().is_empty() => Ok(None),
            Some(RawRedrive::Encoded(s)) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid RedrivePolicy: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn queue_record(id: &str, attrs: serde_json::Value) -> ResourceRecord {
        ResourceRecord::new(
            id.to_string(),
            "active".to_string(),
            BTreeMap::new(),
            ResourceAttributes::from_json(ResourceKind::Queue, attrs).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_resource_record_rejects_empty_id() {
        let attrs = ResourceAttributes::Topic(TopicAttributes::default());
        let result = ResourceRecord::new("  ".to_string(), String::new(), BTreeMap::new(), attrs);
        assert!(result.is_err());
    }

    #[test]
    fn test_resource_kind_from_str() {
        use std::str::FromStr;
        assert_eq!(
            ResourceKind::from_str("Queue").unwrap(),
            ResourceKind::Queue
        );
        assert!(ResourceKind::from_str("bucket").is_err());
    }

    #[test]
    fn test_instance_family_and_size() {
        let attrs = InstanceAttributes {
            instance_type: "r6i.2xlarge".to_string(),
            cpu_credits: None,
            block_device_mappings: vec![],
            launch_time: None,
        };
        assert_eq!(attrs.family(), "r6i");
        assert_eq!(attrs.size(), Some("2xlarge"));
    }

    #[test]
    fn test_queue_attributes_accept_string_encoded_values() {
        let record = queue_record(
            "https://sqs.us-east-1.amazonaws.com/123456789012/orders.fifo",
            json!({
                "ApproximateNumberOfMessages": "12",
                "VisibilityTimeout": 30,
                "ContentBasedDeduplication": "false",
                "FifoQueue": "true",
                "LastModifiedTimestamp": "1700000000"
            }),
        );
        let queue = record.as_queue().unwrap();
        assert_eq!(queue.approximate_number_of_messages, Some(12));
        assert_eq!(queue.visibility_timeout, Some(30));
        assert_eq!(queue.content_based_deduplication, Some(false));
        assert_eq!(queue.fifo_queue, Some(true));
        assert_eq!(queue.last_modified_timestamp, Some(1_700_000_000));
        assert_eq!(record.display_name(), "orders.fifo");
    }

    #[test]
    fn test_redrive_policy_from_encoded_string() {
        let record = queue_record(
            "orders",
            json!({
                "RedrivePolicy": "{\"deadLetterTargetArn\":\"arn:aws:sqs:us-east-1:123456789012:orders-dlq\",\"maxReceiveCount\":\"5\"}"
            }),
        );
        let policy = record.as_queue().unwrap().redrive_policy.clone().unwrap();
        assert_eq!(
            policy.dead_letter_target_arn,
            "arn:aws:sqs:us-east-1:123456789012:orders-dlq"
        );
        assert_eq!(policy.max_receive_count, 5);
    }

    #[test]
    fn test_redrive_policy_from_object() {
        let record = queue_record(
            "orders",
            json!({
                "RedrivePolicy": {"deadLetterTargetArn": "arn:dlq", "maxReceiveCount": 12}
            }),
        );
        let policy = record.as_queue().unwrap().redrive_policy.clone().unwrap();
        assert_eq!(policy.max_receive_count, 12);
    }

    #[test]
    fn test_invalid_queue_attribute_is_rejected() {
        let result = ResourceAttributes::from_json(
            ResourceKind::Queue,
            json!({"VisibilityTimeout": "soon"}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_attributes_must_match_kind() {
        let result =
            ResourceAttributes::from_json(ResourceKind::Instance, json!({"volume_type": "gp2"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_queue_message_totals() {
        let record = queue_record(
            "orders",
            json!({
                "ApproximateNumberOfMessages": "3",
                "ApproximateNumberOfMessagesNotVisible": "2",
                "ApproximateNumberOfMessagesDelayed": "1"
            }),
        );
        let queue = record.as_queue().unwrap();
        assert_eq!(queue.visible_messages(), 3);
        assert_eq!(queue.total_messages(), 6);
    }

    #[test]
    fn test_queue_message_totals_saturate() {
        let record = queue_record(
            "orders",
            json!({
                "ApproximateNumberOfMessages": u64::MAX.to_string(),
                "ApproximateNumberOfMessagesNotVisible": "2",
                "ApproximateNumberOfMessagesDelayed": "1"
            }),
        );
        assert_eq!(record.as_queue().unwrap().total_messages(), u64::MAX);
    }

    #[test]
    fn test_subscription_filter_policy_detection() {
        let mut attrs = SubscriptionAttributes {
            subscription_arn: None,
            topic_arn: "arn:aws:sns:us-east-1:123456789012:orders".to_string(),
            protocol: "sqs".to_string(),
            endpoint: None,
            filter_policy: None,
        };
        assert!(!attrs.has_filter_policy());

        attrs.filter_policy = Some(json!(""));
        assert!(!attrs.has_filter_policy());

        attrs.filter_policy = Some(json!("{\"event\":[\"created\"]}"));
        assert!(attrs.has_filter_policy());
    }

    #[test]
    fn test_topic_display_name_uses_arn_suffix() {
        let record = ResourceRecord::new(
            "arn:aws:sns:us-east-1:123456789012:payments".to_string(),
            "active".to_string(),
            BTreeMap::new(),
            ResourceAttributes::Topic(TopicAttributes::default()),
        )
        .unwrap();
        assert_eq!(record.display_name(), "payments");
    }
}

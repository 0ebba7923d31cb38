use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One validator-set transition observed on a chain.
///
/// `previous_*` fields are empty for the first transition recorded on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSetChangeEvent {
    /// Height at which the new set became active.
    pub height: u64,
    pub timestamp: DateTime<Utc>,
    /// Chain-native hash, only meaningful on the chain that produced it.
    pub validators_hash: String,
    pub previous_validators_hash: String,
    /// Canonical hash, comparable across chains.
    pub content_hash: String,
    pub previous_content_hash: String,
}

impl ValidatorSetChangeEvent {
    pub fn is_first(&self) -> bool {
        self.previous_content_hash.is_empty()
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// `height,timestamp,new_hash,prev_hash,new_content_hash,prev_content_hash`
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.height,
            self.timestamp_string(),
            self.validators_hash,
            self.previous_validators_hash,
            self.content_hash,
            self.previous_content_hash
        )
    }

    pub fn from_csv_line(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        if fields.len() != 6 {
            return Err(format!("expected 6 fields, found {}", fields.len()));
        }
        let height = fields[0]
            .parse::<u64>()
            .map_err(|e| format!("invalid height {:?}: {}", fields[0], e))?;
        let timestamp = DateTime::parse_from_rfc3339(fields[1])
            .map_err(|e| format!("invalid timestamp {:?}: {}", fields[1], e))?
            .with_timezone(&Utc);
        Ok(Self {
            height,
            timestamp,
            validators_hash: fields[2].to_string(),
            previous_validators_hash: fields[3].to_string(),
            content_hash: fields[4].to_string(),
            previous_content_hash: fields[5].to_string(),
        })
    }
}

impl fmt::Display for ValidatorSetChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "height={} time={} content={} previous={}",
            self.height,
            self.timestamp_string(),
            self.content_hash,
            if self.previous_content_hash.is_empty() {
                "-"
            } else {
                self.previous_content_hash.as_str()
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_csv_line() {
        let event = ValidatorSetChangeEvent {
            height: 42,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 10, 0).unwrap(),
            validators_hash: "AA11".to_string(),
            previous_validators_hash: String::new(),
            content_hash: "c0ffee".to_string(),
            previous_content_hash: String::new(),
        };
        assert_eq!(event.to_csv_line(), "42,2024-01-01T00:10:00Z,AA11,,c0ffee,");
        assert!(event.is_first());
        let line = "42,2024-01-01T00:10:00Z,AA11,,c0ffee,\n";
        let parsed = ValidatorSetChangeEvent::from_csv_line(line);
        assert_eq!(parsed.unwrap(), event);
    }

    #[test]
    fn test_csv_line_keeps_subsecond_precision() {
        let line = "7,2024-03-01T10:20:30.123456789Z,B,A,d,c";
        let event = ValidatorSetChangeEvent::from_csv_line(line).unwrap();
        assert_eq!(event.timestamp.timestamp_subsec_nanos(), 123_456_789);
        assert_eq!(event.to_csv_line(), line);
        assert!(!event.is_first());
    }

    #[test]
    fn test_csv_line_rejects_malformed() {
        assert!(ValidatorSetChangeEvent::from_csv_line("1,2,3").is_err());
        assert!(ValidatorSetChangeEvent::from_csv_line("x,2024-01-01T00:00:00Z,a,b,c,d").is_err());
        assert!(ValidatorSetChangeEvent::from_csv_line("1,yesterday,a,b,c,d").is_err());
    }
}

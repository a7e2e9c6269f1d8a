//! Frontend Models
//!
//! Data structures matching the todo service's JSON wire format
//! (protobuf JSON mapping: camelCase fields, default values omitted).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Todo priority. Unknown numeric values from newer servers are kept as
/// `Unrecognized` instead of failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Unspecified,
    Low,
    Medium,
    High,
    Unrecognized(i32),
}

impl Priority {
    /// Display label, total over all variants
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Unspecified => "UNSPECIFIED",
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Unrecognized(_) => "UNKNOWN",
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            Priority::Unspecified => 0,
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Unrecognized(n) => *n,
        }
    }

    pub fn from_number(n: i32) -> Self {
        match n {
            0 => Priority::Unspecified,
            1 => Priority::Low,
            2 => Priority::Medium,
            3 => Priority::High,
            other => Priority::Unrecognized(other),
        }
    }

    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            Priority::Unspecified => Some("PRIORITY_UNSPECIFIED"),
            Priority::Low => Some("PRIORITY_LOW"),
            Priority::Medium => Some("PRIORITY_MEDIUM"),
            Priority::High => Some("PRIORITY_HIGH"),
            Priority::Unrecognized(_) => None,
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "PRIORITY_UNSPECIFIED" => Some(Priority::Unspecified),
            "PRIORITY_LOW" => Some(Priority::Low),
            "PRIORITY_MEDIUM" => Some(Priority::Medium),
            "PRIORITY_HIGH" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.wire_name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_i32(self.number()),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriorityVisitor;

        impl Visitor<'_> for PriorityVisitor {
            type Value = Priority;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a priority enum name or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Priority, E> {
                Priority::from_wire_name(v).ok_or_else(|| E::unknown_variant(v, PRIORITY_NAMES))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Priority, E> {
                i32::try_from(v)
                    .map(Priority::from_number)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Priority, E> {
                i32::try_from(v)
                    .map(Priority::from_number)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }
        }

        deserializer.deserialize_any(PriorityVisitor)
    }
}

const PRIORITY_NAMES: &[&str] = &["PRIORITY_UNSPECIFIED", "PRIORITY_LOW", "PRIORITY_MEDIUM", "PRIORITY_HIGH"];

/// Todo data structure (matches the service's `todo.v1.Todo`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Description, if the service sent a non-empty one
    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    /// Category, if the service sent a non-empty one
    pub fn category(&self) -> Option<&str> {
        non_empty(&self.category)
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Fields sent to `CreateTodo`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// `ListTodos` request filter. Unset fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoFilter {
    pub page_size: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// `ListTodos` response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    #[serde(default)]
    pub todos: Vec<Todo>,
    /// Total matching todos, when the service reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i32>,
}

/// Local form state for the todo being created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftTodo {
    pub title: String,
    pub description: String,
}

impl DraftTodo {
    /// A draft can be submitted once its title has non-whitespace content
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

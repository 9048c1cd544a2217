use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of an instance in a user's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// Real work that carries quota.
    Item,
    TestQuestion,
    Prestudy,
    PreAnnotationPage,
    PostAnnotationPage,
    PrestudyPassedPage,
    PrestudyFailedPage,
}

impl InstanceKind {
    /// Only real items count toward assignment and finished totals.
    pub fn is_real(self) -> bool {
        self == Self::Item
    }

    pub fn is_page(self) -> bool {
        matches!(
            self,
            Self::PreAnnotationPage
                | Self::PostAnnotationPage
                | Self::PrestudyPassedPage
                | Self::PrestudyFailedPage
        )
    }
}

/// One unit of content to annotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub payload: Map<String, Value>,
    /// Text shown to the annotator, derived once at load time.
    pub displayed_text: String,
    pub kind: InstanceKind,
}

impl Instance {
    /// Payload field rendered as a string, if present.
    pub fn field_str(&self, key: &str) -> Option<String> {
        match self.payload.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

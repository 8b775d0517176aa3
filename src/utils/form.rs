use serde::Deserialize;
use validator::ValidationErrors;

/// Raw `application/x-www-form-urlencoded` body, kept as ordered pairs so
/// multi-select fields (`tags=1&tags=3`) survive.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// First value submitted for `key`, trimmed. Missing fields read as empty.
    pub fn text(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Every integer submitted under `key`, in order, without duplicates.
    /// Values that are not integers are dropped.
    pub fn ids(&self, key: &str) -> Vec<i64> {
        let mut ids = Vec::new();
        for (_, value) in self.0.iter().filter(|(k, _)| k == key) {
            if let Ok(id) = value.trim().parse::<i64>() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Flatten validator output into messages a form can list.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid.", field.replace('_', " ")),
            })
        })
        .collect();
    messages.sort();
    messages
}

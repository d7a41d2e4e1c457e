use serde_json::{Map, Value, json};

/// Structural description of the output we ask the model for.
///
/// Descriptors only steer the model. Parsed output is checked by the typed
/// validators in `shape`, not by interpreting these trees.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDescriptor {
    String {
        description: Option<String>,
    },
    Array {
        description: Option<String>,
        items: Box<SchemaDescriptor>,
    },
    Object {
        description: Option<String>,
        // Field order is kept for stable request bodies.
        properties: Vec<(String, SchemaDescriptor)>,
        required: Vec<String>,
    },
}

impl SchemaDescriptor {
    pub fn string(description: impl Into<String>) -> Self {
        SchemaDescriptor::String {
            description: Some(description.into()),
        }
    }

    pub fn array(description: impl Into<String>, items: SchemaDescriptor) -> Self {
        SchemaDescriptor::Array {
            description: Some(description.into()),
            items: Box::new(items),
        }
    }

    /// Object whose every field is required.
    pub fn object(fields: Vec<(&str, SchemaDescriptor)>) -> Self {
        let required = fields.iter().map(|(k, _)| k.to_string()).collect();
        SchemaDescriptor::Object {
            description: None,
            properties: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            required,
        }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            SchemaDescriptor::String { description }
            | SchemaDescriptor::Array { description, .. }
            | SchemaDescriptor::Object { description, .. } => *description = Some(text.into()),
        }
        self
    }

    pub fn required_fields(&self) -> &[String] {
        match self {
            SchemaDescriptor::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// Renders the OpenAPI-subset JSON accepted as `responseSchema`.
    pub fn to_json(&self) -> Value {
        let (mut out, description) = match self {
            SchemaDescriptor::String { description } => (json!({ "type": "STRING" }), description),
            SchemaDescriptor::Array { description, items } => (
                json!({ "type": "ARRAY", "items": items.to_json() }),
                description,
            ),
            SchemaDescriptor::Object {
                description,
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, schema) in properties {
                    props.insert(name.clone(), schema.to_json());
                }
                (
                    json!({
                        "type": "OBJECT",
                        "properties": Value::Object(props),
                        "required": required,
                        "propertyOrdering": properties.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
                    }),
                    description,
                )
            }
        };
        if let (Some(d), Value::Object(map)) = (description, &mut out) {
            map.insert("description".into(), Value::String(d.clone()));
        }
        out
    }
}

/// One output shape per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    MessageSet,
    InspirationMessageSet,
    CoachReplySet,
    ChatReview,
    ProfileAnalysis,
    DateIdeaSet,
}

impl SchemaKind {
    pub fn descriptor(self) -> SchemaDescriptor {
        match self {
            SchemaKind::MessageSet => message_set_schema(),
            SchemaKind::InspirationMessageSet => inspiration_message_set_schema(),
            SchemaKind::CoachReplySet => coach_reply_set_schema(),
            SchemaKind::ChatReview => chat_review_schema(),
            SchemaKind::ProfileAnalysis => profile_analysis_schema(),
            SchemaKind::DateIdeaSet => date_idea_set_schema(),
        }
    }
}

fn message_list(description: &str) -> SchemaDescriptor {
    SchemaDescriptor::object(vec![(
        "messages",
        SchemaDescriptor::array(
            description,
            SchemaDescriptor::string("A single flirty text message."),
        ),
    )])
}

pub fn message_set_schema() -> SchemaDescriptor {
    message_list("An array of 5 unique, short, and creative flirty text messages.")
}

pub fn inspiration_message_set_schema() -> SchemaDescriptor {
    message_list(
        "An array of 5 new, unique, and creative flirty text messages for the specified category. \
Do not repeat any of the examples provided.",
    )
}

pub fn coach_reply_set_schema() -> SchemaDescriptor {
    SchemaDescriptor::object(vec![(
        "replies",
        SchemaDescriptor::array(
            "An array of 3 unique and creative replies to the conversation.",
            SchemaDescriptor::object(vec![
                ("reply", SchemaDescriptor::string("The suggested flirty reply.")),
                (
                    "explanation",
                    SchemaDescriptor::string(
                        "A brief explanation of why this reply is effective \
(e.g., 'This is playful and shows you're confident').",
                    ),
                ),
            ]),
        ),
    )])
}

pub fn chat_review_schema() -> SchemaDescriptor {
    SchemaDescriptor::object(vec![
        (
            "overallFeedback",
            SchemaDescriptor::string(
                "Overall feedback on the user's conversation style, tone, and strategy. \
Be constructive and encouraging.",
            ),
        ),
        (
            "critiques",
            SchemaDescriptor::array(
                "An array of critiques for specific messages sent by the user.",
                SchemaDescriptor::object(vec![
                    (
                        "originalMessage",
                        SchemaDescriptor::string(
                            "The verbatim text of the user's message that is being critiqued.",
                        ),
                    ),
                    (
                        "critique",
                        SchemaDescriptor::string(
                            "A concise critique explaining what could be improved in this specific message \
(e.g., 'A bit too passive', 'Could be more playful').",
                        ),
                    ),
                    (
                        "suggestion",
                        SchemaDescriptor::string(
                            "A better, alternative message the user could have sent instead.",
                        ),
                    ),
                ]),
            ),
        ),
    ])
}

pub fn profile_analysis_schema() -> SchemaDescriptor {
    SchemaDescriptor::object(vec![
        (
            "overallFeedback",
            SchemaDescriptor::string(
                "A summary of the dating profile's strengths and weaknesses. Offer actionable advice \
for improvement. The tone should be encouraging and constructive.",
            ),
        ),
        (
            "photoAnalysis",
            SchemaDescriptor::array(
                "An array of critiques for each of the user's photos. \
Provide one critique object per photo analyzed.",
                SchemaDescriptor::object(vec![
                    (
                        "photoDescription",
                        SchemaDescriptor::string(
                            "A brief, one-sentence description of the photo being critiqued \
(e.g., 'The photo of you hiking with a dog').",
                        ),
                    ),
                    (
                        "critique",
                        SchemaDescriptor::string(
                            "A concise critique explaining what works or doesn't work in this photo.",
                        ),
                    ),
                    (
                        "suggestion",
                        SchemaDescriptor::string(
                            "A concrete suggestion for improving or replacing the photo.",
                        ),
                    ),
                ]),
            ),
        ),
        (
            "bioAnalysis",
            SchemaDescriptor::object(vec![
                (
                    "critique",
                    SchemaDescriptor::string(
                        "A concise critique of the bio (e.g., 'It's a bit generic and uses clichés').",
                    ),
                ),
                (
                    "suggestion",
                    SchemaDescriptor::string(
                        "A rewritten, more engaging and charming bio that the user could use instead.",
                    ),
                ),
            ])
            .describe("A critique of the user's bio."),
        ),
    ])
}

pub fn date_idea_set_schema() -> SchemaDescriptor {
    SchemaDescriptor::object(vec![(
        "ideas",
        SchemaDescriptor::array(
            "An array of 3 unique and creative date ideas that match the user's criteria.",
            SchemaDescriptor::object(vec![
                ("title", SchemaDescriptor::string("A short, catchy title for the date idea.")),
                (
                    "description",
                    SchemaDescriptor::string(
                        "A one or two sentence description of the date idea, \
explaining what it is and why it's fun.",
                    ),
                ),
                (
                    "emoji",
                    SchemaDescriptor::string("A single emoji that represents the date idea."),
                ),
            ]),
        ),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_lists_all_fields_as_required() {
        let s = SchemaKind::ChatReview.descriptor();
        assert_eq!(s.required_fields(), ["overallFeedback", "critiques"]);
    }

    #[test]
    fn renders_nested_json_schema() {
        let v = SchemaKind::CoachReplySet.descriptor().to_json();
        assert_eq!(v["type"], "OBJECT");
        assert_eq!(v["required"], json!(["replies"]));
        let items = &v["properties"]["replies"]["items"];
        assert_eq!(items["type"], "OBJECT");
        assert_eq!(items["required"], json!(["reply", "explanation"]));
        assert_eq!(items["properties"]["reply"]["type"], "STRING");
        assert!(
            v["properties"]["replies"]["description"]
                .as_str()
                .unwrap()
                .contains("3 unique")
        );
    }

    #[test]
    fn inspiration_schema_differs_only_in_wording() {
        let a = SchemaKind::MessageSet.descriptor().to_json();
        let b = SchemaKind::InspirationMessageSet.descriptor().to_json();
        assert_ne!(a, b);
        assert_eq!(a["required"], b["required"]);
        assert!(
            b["properties"]["messages"]["description"]
                .as_str()
                .unwrap()
                .contains("Do not repeat")
        );
    }

    #[test]
    fn nested_object_keeps_its_description() {
        let v = SchemaKind::ProfileAnalysis.descriptor().to_json();
        assert_eq!(
            v["properties"]["bioAnalysis"]["description"],
            "A critique of the user's bio."
        );
        assert_eq!(
            v["propertyOrdering"],
            json!(["overallFeedback", "photoAnalysis", "bioAnalysis"])
        );
    }
}

// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of auxiliary "task context" objects into prompt text.
//!
//! A task context references data the user is working with (e.g. a record
//! being edited) and is rendered through a template with two placeholders:
//! one for the task label, one for the data. The longer placeholder name is
//! substituted first, so a placeholder whose name is a prefix of the other
//! (`<TASK>` inside `<TASKDATA>`) can never corrupt the result.

use serde_json::Value;

/// Default placeholder for the task label.
pub const DEFAULT_TASK_VAR: &str = "<TASK>";
/// Default placeholder for the rendered task data.
pub const DEFAULT_TASK_DATA_VAR: &str = "<TASKDATA>";

/// One auxiliary context item to render into the prompt.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Item-specific template; falls back to the caller's default template,
    /// and with neither the raw data is used as-is.
    pub template: Option<String>,
    /// Item-specific task-label placeholder name.
    pub task_var: Option<String>,
    /// Item-specific data placeholder name.
    pub task_data_var: Option<String>,
    /// The referenced data. Non-string values are serialized with stable,
    /// human-readable formatting.
    pub data: Value,
}

impl TaskContext {
    /// A context item carrying only data, rendered through the default template.
    pub fn from_data(data: Value) -> Self {
        Self {
            template: None,
            task_var: None,
            task_data_var: None,
            data,
        }
    }
}

/// Renders task context items into a single string, items separated by a
/// blank line.
pub fn stringify_task_contexts(
    task_label: &str,
    contexts: &[TaskContext],
    default_template: Option<&str>,
) -> String {
    contexts
        .iter()
        .map(|ctx| render_one(task_label, ctx, default_template))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_one(task_label: &str, ctx: &TaskContext, default_template: Option<&str>) -> String {
    let data = match &ctx.data {
        Value::String(s) => s.clone(),
        value => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    };

    let Some(template) = ctx.template.as_deref().or(default_template) else {
        return data;
    };

    let task_var = ctx.task_var.as_deref().unwrap_or(DEFAULT_TASK_VAR);
    let data_var = ctx.task_data_var.as_deref().unwrap_or(DEFAULT_TASK_DATA_VAR);

    // Longest placeholder first: replacing <TASK> before <TASKDATA> would
    // mangle every <TASKDATA> occurrence.
    if task_var.len() > data_var.len() {
        template.replace(task_var, task_label).replace(data_var, &data)
    } else {
        template.replace(data_var, &data).replace(task_var, task_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn longest_placeholder_is_substituted_first() {
        let ctx = TaskContext::from_data(json!("the data"));
        let rendered = stringify_task_contexts(
            "review",
            &[ctx],
            Some("Task: <TASK>\nData: <TASKDATA>"),
        );
        assert_eq!(rendered, "Task: review\nData: the data");
    }

    #[test]
    fn prefix_collision_in_either_direction() {
        // Item placeholders where the data var is the SHORTER one.
        let ctx = TaskContext {
            template: Some("<D> then <DATA>".to_string()),
            task_var: Some("<DATA>".to_string()),
            task_data_var: Some("<D>".to_string()),
            data: json!("payload"),
        };
        let rendered = stringify_task_contexts("label", &[ctx], None);
        assert_eq!(rendered, "payload then label");
    }

    #[test]
    fn non_string_data_is_pretty_printed() {
        let ctx = TaskContext::from_data(json!({"name": "widget", "count": 3}));
        let rendered = stringify_task_contexts("edit", &[ctx], Some("<TASKDATA>"));
        assert!(rendered.contains("\"name\": \"widget\""));
        assert!(rendered.contains("\"count\": 3"));
    }

    #[test]
    fn no_template_falls_back_to_raw_data() {
        let ctx = TaskContext::from_data(json!("just the data"));
        assert_eq!(
            stringify_task_contexts("ignored", &[ctx], None),
            "just the data"
        );
    }

    #[test]
    fn item_template_overrides_default() {
        let ctx = TaskContext {
            template: Some("custom: <TASKDATA>".to_string()),
            task_var: None,
            task_data_var: None,
            data: json!("x"),
        };
        assert_eq!(
            stringify_task_contexts("t", &[ctx], Some("default: <TASKDATA>")),
            "custom: x"
        );
    }

    #[test]
    fn multiple_items_join_with_blank_line() {
        let items = vec![
            TaskContext::from_data(json!("first")),
            TaskContext::from_data(json!("second")),
        ];
        assert_eq!(
            stringify_task_contexts("t", &items, Some("<TASKDATA>")),
            "first\n\nsecond"
        );
    }

    #[test]
    fn empty_context_list_renders_empty() {
        assert_eq!(stringify_task_contexts("t", &[], Some("<TASKDATA>")), "");
    }
}

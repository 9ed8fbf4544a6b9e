use std::fmt::Write as _;

use serde::Serialize;
use tabs_core::WidgetView;
use tabs_engine::TabsHost;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub generated_at: String,
    pub settled: bool,
    pub layout_notifications: usize,
    pub widgets: Vec<WidgetSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSummary {
    pub root_id: Option<String>,
    pub phase: String,
    pub tabs: Vec<String>,
    pub active_tab: Option<String>,
    pub visible: bool,
}

impl WidgetSummary {
    fn new(root_id: Option<String>, view: WidgetView) -> Self {
        Self {
            root_id,
            phase: format!("{:?}", view.phase),
            tabs: view.tabs,
            active_tab: view.active_tab,
            visible: view.visible,
        }
    }
}

impl Summary {
    pub fn collect(host: &TabsHost, settled: bool, layout_notifications: usize) -> Self {
        let doc = host.document();
        let widgets = host
            .widget_ids()
            .into_iter()
            .filter_map(|widget| {
                let root_id = host
                    .widget_root(widget)
                    .and_then(|root| doc.attr(root, "id"))
                    .map(str::to_owned);
                host.view(widget).map(|view| WidgetSummary::new(root_id, view))
            })
            .collect();

        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            settled,
            layout_notifications,
            widgets,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} widget(s), settled: {}, layout notifications: {}",
            self.widgets.len(),
            self.settled,
            self.layout_notifications
        );
        for (index, widget) in self.widgets.iter().enumerate() {
            let name = widget.root_id.as_deref().unwrap_or("<no id>");
            let tabs = if widget.tabs.is_empty() {
                "-".to_string()
            } else {
                widget.tabs.join(", ")
            };
            let _ = writeln!(
                out,
                "  #{} {name}: {} {} tabs [{tabs}] active {}",
                index + 1,
                widget.phase,
                if widget.visible { "visible" } else { "hidden" },
                widget.active_tab.as_deref().unwrap_or("-"),
            );
        }
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Summary {
        Summary {
            generated_at: "2026-01-01T00:00:00+00:00".into(),
            settled: true,
            layout_notifications: 2,
            widgets: vec![
                WidgetSummary {
                    root_id: Some("product-tabs".into()),
                    phase: "Visible".into(),
                    tabs: vec!["t1".into(), "t3".into()],
                    active_tab: Some("t3".into()),
                    visible: true,
                },
                WidgetSummary {
                    root_id: None,
                    phase: "Visible".into(),
                    tabs: Vec::new(),
                    active_tab: None,
                    visible: false,
                },
            ],
        }
    }

    #[test]
    fn text_lists_each_widget() {
        assert_eq!(
            sample().render_text(),
            "2 widget(s), settled: true, layout notifications: 2\n  \
             #1 product-tabs: Visible visible tabs [t1, t3] active t3\n  \
             #2 <no id>: Visible hidden tabs [-] active -\n"
        );
    }

    #[test]
    fn json_carries_the_same_fields() {
        let json: serde_json::Value = serde_json::from_str(&sample().render_json().unwrap()).unwrap();
        assert_eq!(json["widgets"][0]["tabs"], serde_json::json!(["t1", "t3"]));
        assert_eq!(json["widgets"][1]["root_id"], serde_json::Value::Null);
        assert_eq!(json["layout_notifications"], 2);
    }
}

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::Value;
use tracing::info;

use report_spec::FinalizedReport;

use crate::RenderError;
use crate::format::{DocumentModel, REVIEWED_LABEL};

const TEMPLATE_NAME: &str = "report";
const TEMPLATE: &str = include_str!("templates/report.html.hbs");

/// Standalone printable document; styling is inlined so it can be handed to
/// any print dialog as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDocument {
    pub title: String,
    pub html: String,
}

/// Renders finalized reports through the embedded print template.
pub struct PrintRenderer {
    handlebars: Handlebars<'static>,
}

impl PrintRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_helper("or_dash", Box::new(helper_or_dash));
        handlebars
            .register_template_string(TEMPLATE_NAME, TEMPLATE)
            .map_err(Box::new)?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, report: &FinalizedReport) -> Result<PrintDocument, RenderError> {
        let model = DocumentModel::build(report)?;
        let document = self.render_model(&model)?;
        info!(
            report = %report.header().id,
            lines = model.lines.len(),
            "print document rendered"
        );
        Ok(document)
    }

    pub fn render_model(&self, model: &DocumentModel) -> Result<PrintDocument, RenderError> {
        let mut data = serde_json::to_value(model)?;
        if let Value::Object(map) = &mut data {
            map.insert("reviewed_label".into(), Value::String(REVIEWED_LABEL.into()));
        }
        let html = self.handlebars.render(TEMPLATE_NAME, &data)?;
        Ok(PrintDocument {
            title: model.title.to_string(),
            html,
        })
    }
}

/// Writes the escaped value, or `-` when it is blank.
fn helper_or_dash(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h
        .param(0)
        .and_then(|param| param.value().as_str())
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        out.write("-")?;
    } else {
        out.write(&handlebars::html_escape(text))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{DocumentLine, HeaderFact};
    use report_spec::RowKind;

    fn model(value: &str) -> DocumentModel {
        DocumentModel {
            title: "Dnevni izveštaj",
            facts: vec![HeaderFact {
                label: "Komitent",
                value: "Universal Logistics".into(),
            }],
            lines: vec![DocumentLine {
                kind: RowKind::Note,
                label: "Obrazloženje".into(),
                value: value.into(),
                nested: true,
            }],
            reviewed: false,
            file_name: "Dnevni_izvestaj_2024-05-14.pdf".into(),
        }
    }

    #[test]
    fn values_are_escaped() {
        let renderer = PrintRenderer::new().expect("template");
        let doc = renderer
            .render_model(&model("<b>staze</b> & prolazi"))
            .expect("render");
        assert!(doc.html.contains("&lt;b&gt;staze&lt;/b&gt; &amp; prolazi"));
        assert!(!doc.html.contains("<b>staze"));
    }

    #[test]
    fn blank_values_render_as_dash() {
        let renderer = PrintRenderer::new().expect("template");
        let doc = renderer.render_model(&model("  ")).expect("render");
        assert!(doc.html.contains(r#"<td class="value">-</td>"#));
        assert!(doc.html.contains(r#"<tr class="note nested">"#));
        assert!(!doc.html.contains("Pregledano"));
    }
}

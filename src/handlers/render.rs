use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Fills `{{name}}` placeholders in a file under `templates/`.
///
/// Values added with [`Page::text`] are HTML-escaped; [`Page::html`] is for
/// fragments the caller already built from escaped parts.
pub struct Page {
    template: &'static str,
    vars: Vec<(&'static str, String)>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self { template, vars: Vec::new() }
    }

    pub fn text(mut self, name: &'static str, value: &str) -> Self {
        self.vars.push((name, escape_html(value)));
        self
    }

    pub fn html(mut self, name: &'static str, value: String) -> Self {
        self.vars.push((name, value));
        self
    }

    pub fn render(self) -> Response {
        let path = format!("templates/{}", self.template);
        match std::fs::read_to_string(&path) {
            Ok(template) => Html(fill(template, &self.vars)).into_response(),
            Err(e) => {
                tracing::error!("Failed to read template {}: {}", path, e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error loading page").into_response()
            }
        }
    }
}

fn fill(mut template: String, vars: &[(&str, String)]) -> String {
    for (name, value) in vars {
        template = template.replace(&format!("{{{{{}}}}}", name), value);
    }
    template
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `<p class="...">message</p>` or nothing.
pub fn flash(class: &str, message: Option<&str>) -> String {
    match message {
        Some(msg) if !msg.is_empty() => format!(r#"<p class="{}">{}</p>"#, class, escape_html(msg)),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders() {
        let vars = vec![("title", "Buy milk".to_string()), ("count", "2".to_string())];
        assert_eq!(
            fill("<h1>{{title}}</h1><p>{{count}} / {{title}}</p>".to_string(), &vars),
            "<h1>Buy milk</h1><p>2 / Buy milk</p>"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn flash_is_empty_without_message() {
        assert_eq!(flash("error", None), "");
        assert_eq!(flash("error", Some("")), "");
        assert_eq!(flash("error", Some("<b>")), r#"<p class="error">&lt;b&gt;</p>"#);
    }
}

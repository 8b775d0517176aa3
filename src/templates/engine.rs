use minijinja::{Environment, Value, default_auto_escape_callback};

/// Every view shipped with the binary, keyed by the name handlers render.
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("404.html", include_str!("../../templates/404.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("users/index.html", include_str!("../../templates/users/index.html")),
    ("users/new.html", include_str!("../../templates/users/new.html")),
    ("users/show.html", include_str!("../../templates/users/show.html")),
    ("users/edit.html", include_str!("../../templates/users/edit.html")),
    ("posts/new.html", include_str!("../../templates/posts/new.html")),
    ("posts/show.html", include_str!("../../templates/posts/show.html")),
    ("posts/edit.html", include_str!("../../templates/posts/edit.html")),
    ("tags/index.html", include_str!("../../templates/tags/index.html")),
    ("tags/new.html", include_str!("../../templates/tags/new.html")),
    ("tags/show.html", include_str!("../../templates/tags/show.html")),
    ("tags/edit.html", include_str!("../../templates/tags/edit.html")),
];

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Result<Self, minijinja::Error> {
        Self::with_templates(EMBEDDED_TEMPLATES)
    }

    /// Fails on the first template that does not compile.
    fn with_templates(templates: &[(&'static str, &'static str)]) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.add_filter("datetime", format_datetime);

        for &(name, source) in templates {
            env.add_template(name, source).inspect_err(|e| {
                tracing::error!("Failed to load template {}: {}", name, e);
            })?;
        }

        Ok(Self { env })
    }

    pub fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// `{{ post.created_at | datetime }}`: RFC 3339 in, human readable out.
/// Anything unparsable is shown as-is.
fn format_datetime(value: String) -> String {
    match chrono::DateTime::parse_from_rfc3339(&value) {
        Ok(dt) => dt.format("%a %b %-d %Y, %-I:%M %p").to_string(),
        Err(_) => value,
    }
}

//! The script façade.
//!
//! [`Scripts`] bundles a [`Registry`], a [`Queue`] and a [`Resolver`] behind
//! the procedural operations callers expect: register, enqueue, dequeue,
//! deregister, query, attach inline code or localized data, and finally emit
//! everything in dependency order. One context is meant to live for one
//! rendering session; it is owned by the caller and nothing here is global.

use std::collections::HashSet;
use std::str::FromStr;

use serde_json::Value;

use crate::asset::Asset;
use crate::core::{Group, Phase, Position, Screen, Settings, Version};
use crate::emit::Emission;
use crate::error::RegistryError;
use crate::notice::{Notice, Notices, VERSION};
use crate::queue::{Queue, split_handle};
use crate::registry::Registry;
use crate::resolver::{Resolution, Resolver};

/// Handles that may only be deregistered on the admin and login screens while
/// their enqueue step runs.
pub const PROTECTED_HANDLES: &[&str] = &[
    "jquery",
    "jquery-core",
    "jquery-ui-core",
    "jquery-ui-accordion",
    "jquery-ui-autocomplete",
    "jquery-ui-button",
    "jquery-ui-datepicker",
    "jquery-ui-dialog",
    "jquery-ui-draggable",
    "jquery-ui-droppable",
    "jquery-ui-menu",
    "jquery-ui-mouse",
    "jquery-ui-position",
    "jquery-ui-progressbar",
    "jquery-ui-resizable",
    "jquery-ui-selectable",
    "jquery-ui-slider",
    "jquery-ui-sortable",
    "jquery-ui-spinner",
    "jquery-ui-tabs",
    "jquery-ui-tooltip",
    "jquery-ui-widget",
    "underscore",
    "backbone",
];

/// Which list [`Scripts::script_is`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum List {
    Registered,
    /// Queued directly, or required by something queued.
    #[default]
    Enqueued,
    ToDo,
    Done,
}

impl FromStr for List {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" | "scripts" => Ok(List::Registered),
            "enqueued" | "queue" => Ok(List::Enqueued),
            "to_do" | "to_print" => Ok(List::ToDo),
            "done" | "printed" => Ok(List::Done),
            other => Err(format!("unknown list '{other}'")),
        }
    }
}

/// A script registration and enqueue session.
#[derive(Debug, Default)]
pub struct Scripts {
    settings: Settings,
    phase: Phase,
    registry: Registry,
    queue: Queue,
    resolver: Resolver,
    pub(crate) notices: Notices,
    /// Resolution notices already raised, so later passes stay quiet.
    reported: HashSet<Notice>,
}

impl Scripts {
    pub fn new(settings: Settings) -> Self {
        Self {
            phase: settings.phase,
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance (or rewind) the session lifecycle.
    pub fn set_phase(&mut self, phase: Phase) {
        tracing::debug!(?phase, "lifecycle phase");
        self.phase = phase;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.as_slice()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Record resolution notices, skipping any raised by an earlier pass.
    fn report(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            if self.reported.insert(notice.clone()) {
                self.notices.push(notice);
            }
        }
    }

    fn maybe_doing_it_wrong(&mut self, function: &'static str, handle: &str) {
        if self.phase != Phase::Boot {
            return;
        }

        let mut message = String::from(
            "Scripts and styles should not be registered or enqueued until the session is ready.",
        );

        if !handle.is_empty() {
            message.push_str(&format!(" This notice was triggered by the {handle} handle."));
        }

        self.notices.doing_it_wrong(function, message, VERSION);
    }

    /// Register a new script.
    ///
    /// Passing `None` as `src` registers an alias of its dependencies.
    /// Returns `false` if a script with a source is already registered under
    /// `handle`.
    pub fn register_script(
        &mut self,
        handle: &str,
        src: Option<&str>,
        deps: &[&str],
        ver: Version,
        in_footer: bool,
    ) -> bool {
        self.maybe_doing_it_wrong("register_script", handle);

        let registered = self.add(handle, src, deps, ver).is_ok();

        if in_footer {
            let _ = self
                .registry
                .add_data(handle, "group", Value::from(Group::Footer as u8));
        }

        registered
    }

    fn add(
        &mut self,
        handle: &str,
        src: Option<&str>,
        deps: &[&str],
        ver: Version,
    ) -> Result<(), RegistryError> {
        self.registry.add(
            handle,
            src.map(str::to_string),
            deps.iter().map(|dep| dep.to_string()).collect(),
            ver,
        )
    }

    /// Enqueue a script, registering it first when a source is given.
    ///
    /// An existing registration is never overwritten. `handle` may carry a
    /// `?args` suffix which is appended to the version query on output.
    pub fn enqueue_script(
        &mut self,
        handle: &str,
        src: Option<&str>,
        deps: &[&str],
        ver: Version,
        in_footer: bool,
    ) {
        self.maybe_doing_it_wrong("enqueue_script", handle);

        let src = src.filter(|src| !src.is_empty());

        if src.is_some() || in_footer {
            let (name, _) = split_handle(handle);

            if src.is_some() {
                let _ = self.add(name, src, deps, ver);
            }

            if in_footer {
                let _ = self
                    .registry
                    .add_data(name, "group", Value::from(Group::Footer as u8));
            }
        }

        self.queue.enqueue(handle);
    }

    pub fn dequeue_script(&mut self, handle: &str) {
        self.maybe_doing_it_wrong("dequeue_script", handle);
        self.queue.dequeue(handle);
    }

    /// Remove a registered script.
    ///
    /// Core library handles in [`PROTECTED_HANDLES`] are left alone on the
    /// admin and login screens unless this is called while enqueueing.
    pub fn deregister_script(&mut self, handle: &str) {
        self.maybe_doing_it_wrong("deregister_script", handle);

        let guarded = matches!(self.settings.screen, Screen::Admin | Screen::Login)
            && self.phase != Phase::Enqueueing;

        if guarded && PROTECTED_HANDLES.contains(&handle) {
            self.notices.doing_it_wrong(
                "deregister_script",
                format!(
                    "Do not deregister the {handle} script in the administration area. \
                     To target the front-end theme, use the enqueue phase."
                ),
                VERSION,
            );
            return;
        }

        self.registry.remove(handle);
    }

    /// Whether a script is in the given list.
    pub fn script_is(&mut self, handle: &str, list: List) -> bool {
        self.maybe_doing_it_wrong("script_is", handle);

        match list {
            List::Registered => self.registry.contains(handle),
            List::Enqueued => self.queue.requires(&self.registry, handle),
            List::ToDo => self.resolver.is_to_do(handle),
            List::Done => self.resolver.is_done(handle),
        }
    }

    pub fn registered(&self, handle: &str) -> Option<&Asset> {
        self.registry.get(handle)
    }

    /// Attach metadata to a registered script.
    pub fn script_add_data(&mut self, handle: &str, key: &str, value: Value) -> bool {
        self.registry.add_data(handle, key, value).is_ok()
    }

    /// Add inline code printed before or after a registered script.
    ///
    /// Fragments are printed in the order they were added. Wrapping
    /// `<script>` tags are stripped with a notice.
    pub fn add_inline_script(&mut self, handle: &str, data: &str, position: Position) -> bool {
        self.maybe_doing_it_wrong("add_inline_script", handle);

        let data = if data.to_ascii_lowercase().contains("</script>") {
            self.notices.doing_it_wrong(
                "add_inline_script",
                "Do not pass <script> tags to add_inline_script().",
                VERSION,
            );
            strip_script_tags(data)
        } else {
            data.to_string()
        };

        self.add_inline(handle, data, position).is_ok()
    }

    fn add_inline(&mut self, handle: &str, data: String, position: Position) -> Result<(), RegistryError> {
        if data.is_empty() {
            return Err(RegistryError::EmptyInline(handle.to_string()));
        }

        self.registry
            .add_data(handle, position.key(), Value::String(data))
    }

    /// Attach a JavaScript object to a registered script:
    ///
    /// ```text
    /// var object_name = {"key":"value"};
    /// ```
    ///
    /// Top-level scalar values are converted to strings.
    pub fn localize_script(&mut self, handle: &str, object_name: &str, l10n: Value) -> bool {
        self.maybe_doing_it_wrong("localize_script", handle);

        let handle = if handle == "jquery" {
            "jquery-core"
        } else {
            handle
        };

        let mut after = None;

        let l10n = match l10n {
            Value::Object(mut map) => {
                if let Some(value) = map.remove("l10n_print_after") {
                    after = value.as_str().map(str::to_string);
                }

                for value in map.values_mut() {
                    if let Some(text) = scalar_to_string(value) {
                        *value = Value::String(text);
                    }
                }

                Value::Object(map)
            }
            Value::Array(mut items) => {
                for value in items.iter_mut() {
                    if let Some(text) = scalar_to_string(value) {
                        *value = Value::String(text);
                    }
                }

                Value::Array(items)
            }
            other => {
                self.notices.doing_it_wrong(
                    "localize_script",
                    "The l10n parameter must be an object or an array. To pass arbitrary data to scripts, use add_inline_script() instead.",
                    VERSION,
                );
                other
            }
        };

        let mut script = format!("var {object_name} = {l10n};");

        if let Some(after) = after {
            script.push_str(&format!("\n{after};"));
        }

        if let Some(existing) = self
            .registry
            .get_data(handle, "data")
            .and_then(Value::as_str)
            .filter(|existing| !existing.is_empty())
        {
            script = format!("{existing}\n{script}");
        }

        self.registry
            .add_data(handle, "data", Value::String(script))
            .is_ok()
    }

    /// Set the translation domain of a registered script. The script gains a
    /// dependency on `wp-i18n` so the translations have somewhere to go.
    pub fn set_script_translations(
        &mut self,
        handle: &str,
        domain: Option<&str>,
        path: Option<&str>,
    ) -> bool {
        self.maybe_doing_it_wrong("set_script_translations", handle);

        let Ok(asset) = self.registry.get_mut(handle) else {
            return false;
        };

        if !asset.deps.iter().any(|dep| dep == "wp-i18n") {
            asset.deps.push("wp-i18n".to_string());
        }

        asset.textdomain = Some(domain.unwrap_or("default").to_string());
        asset.translations_path = path.map(str::to_string);

        true
    }

    /// Resolve the queue without emitting anything.
    pub fn resolve(&mut self) -> Resolution {
        self.resolver
            .all_deps(&self.registry, self.queue.handles(), None);

        let resolution = self.resolver.resolution(&self.registry);
        self.report(resolution.notices.iter().cloned());
        resolution
    }

    /// Emit `handles` (or the whole queue) in dependency order.
    ///
    /// With `Some(Group::Head)` only head assets are emitted and footer
    /// assets wait for a later pass and stay queued. Emitted assets are
    /// marked done, leave the queue, and are skipped by every later pass.
    pub fn do_items(&mut self, handles: Option<&[&str]>, group: Option<Group>) -> Vec<Emission> {
        let handles: Vec<String> = match handles {
            Some(handles) => handles.iter().map(|h| h.to_string()).collect(),
            None => self.queue.handles().to_vec(),
        };

        self.resolver.all_deps(&self.registry, &handles, None);
        let notices = self.resolver.take_notices();
        self.report(notices);

        let mut emitted = Vec::new();

        for handle in self.resolver.take_to_do() {
            if self.resolver.is_done(&handle) {
                continue;
            }

            let Some(asset) = self.registry.get(&handle) else {
                continue;
            };

            let placed = self.resolver.group_of(&handle).unwrap_or(asset.group);

            if group == Some(Group::Head) && placed > Group::Head {
                tracing::debug!(handle = handle.as_str(), "deferred to footer");
                continue;
            }

            if !asset.is_alias() || asset.has_inline() {
                let args = self
                    .queue
                    .args(&handle)
                    .or_else(|| self.resolver.args(&handle));

                emitted.push(Emission::new(asset, placed, args, &self.settings));
            }

            self.resolver.mark_done(&handle);
            self.queue.dequeue(&handle);
        }

        emitted
    }

    pub fn do_head_items(&mut self) -> Vec<Emission> {
        self.do_items(None, Some(Group::Head))
    }

    pub fn do_footer_items(&mut self) -> Vec<Emission> {
        self.do_items(None, Some(Group::Footer))
    }

    /// Emit the given handles, or the queue if none are given.
    pub fn print_scripts(&mut self, handles: Option<&[&str]>) -> Vec<Emission> {
        self.maybe_doing_it_wrong("print_scripts", "");

        match handles {
            Some(handles) if !handles.is_empty() => self.do_items(Some(handles), None),
            _ if self.queue.is_empty() => Vec::new(),
            _ => self.do_items(None, None),
        }
    }
}

/// Convert a scalar JSON value to its string form; `None` for non-scalars.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(decode_entities(text)),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Replace `<script ...>inner</script>` with `inner`, keeping surrounding
/// text, then trim.
fn strip_script_tags(data: &str) -> String {
    // ASCII lowercasing keeps byte offsets intact.
    let lower = data.to_ascii_lowercase();

    let stripped = lower.find("<script").and_then(|open| {
        let start = open + lower[open..].find('>')? + 1;
        let close = lower.rfind("</script>").filter(|&close| close >= start)?;

        Some(format!(
            "{}{}{}",
            &data[..open],
            &data[start..close],
            &data[close + "</script>".len()..]
        ))
    });

    stripped.as_deref().unwrap_or(data).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ready() -> Scripts {
        Scripts::new(Settings::new().phase(Phase::Ready).default_version("6.0"))
    }

    fn handles(emitted: &[Emission]) -> Vec<&str> {
        emitted.iter().map(|e| e.handle.as_str()).collect()
    }

    #[test]
    fn test_end_to_end() {
        let mut scripts = ready();
        assert!(scripts.register_script("a", Some("/a.js"), &[], Version::Auto, false));
        assert!(scripts.register_script("b", Some("/b.js"), &["a"], Version::Auto, false));
        scripts.enqueue_script("b", None, &[], Version::Auto, false);

        assert_eq!(scripts.resolve().handles(), ["a", "b"]);

        let emitted = scripts.print_scripts(None);
        assert_eq!(handles(&emitted), ["a", "b"]);
        assert_eq!(emitted[0].src.as_deref(), Some("/a.js?ver=6.0"));
        assert!(scripts.notices().is_empty());

        // Nothing is emitted twice.
        assert!(scripts.print_scripts(None).is_empty());
        assert!(scripts.script_is("a", List::Done));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut scripts = ready();
        assert!(scripts.register_script("a", Some("/a.js"), &[], Version::explicit("1"), false));
        assert!(!scripts.register_script("a", Some("/b.js"), &[], Version::explicit("2"), false));

        let asset = scripts.registered("a").unwrap();
        assert_eq!(asset.src.as_deref(), Some("/a.js"));
        assert_eq!(asset.ver, Version::explicit("1"));
    }

    #[test]
    fn test_dequeue_keeps_registration() {
        let mut scripts = ready();
        scripts.enqueue_script("a", Some("/a.js"), &[], Version::Auto, false);
        assert!(scripts.script_is("a", List::Enqueued));

        scripts.dequeue_script("a");
        assert!(!scripts.script_is("a", List::Enqueued));
        assert!(scripts.script_is("a", List::Registered));
    }

    #[test]
    fn test_enqueue_does_not_overwrite() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        scripts.enqueue_script("a", Some("/other.js"), &[], Version::None, true);

        let asset = scripts.registered("a").unwrap();
        assert_eq!(asset.src.as_deref(), Some("/a.js"));
        assert_eq!(asset.group, Group::Footer);
    }

    #[test]
    fn test_enqueue_unregistered_is_deferred() {
        let mut scripts = ready();
        scripts.enqueue_script("ghost", None, &[], Version::Auto, false);
        scripts.enqueue_script("a", Some("/a.js"), &[], Version::Auto, false);

        assert!(scripts.queue().contains("ghost"));
        assert!(scripts.notices().is_empty());

        let emitted = scripts.do_items(None, None);
        assert_eq!(handles(&emitted), ["a"]);
        assert_eq!(
            scripts.notices(),
            [Notice::MissingDependency {
                handle: "ghost".into(),
                missing: "ghost".into()
            }]
        );
    }

    #[test]
    fn test_protected_handles() {
        let mut scripts = Scripts::new(Settings::new().screen(Screen::Admin).phase(Phase::Ready));
        scripts.register_script("jquery", None, &["jquery-core"], Version::Auto, false);
        scripts.register_script("custom", Some("/c.js"), &[], Version::Auto, false);

        scripts.deregister_script("jquery");
        scripts.deregister_script("custom");

        assert!(scripts.script_is("jquery", List::Registered));
        assert!(!scripts.script_is("custom", List::Registered));
        assert!(matches!(
            scripts.notices(),
            [Notice::DoingItWrong {
                function: "deregister_script",
                ..
            }]
        ));

        scripts.set_phase(Phase::Enqueueing);
        scripts.deregister_script("jquery");
        assert!(!scripts.script_is("jquery", List::Registered));
    }

    #[test]
    fn test_protected_on_login() {
        let mut scripts = Scripts::new(Settings::new().screen(Screen::Login).phase(Phase::Ready));
        scripts.register_script("underscore", Some("/underscore.js"), &[], Version::Auto, false);

        scripts.deregister_script("underscore");
        assert!(scripts.script_is("underscore", List::Registered));
        assert!(matches!(
            scripts.notices(),
            [Notice::DoingItWrong {
                function: "deregister_script",
                version,
                ..
            }] if *version == env!("CARGO_PKG_VERSION")
        ));

        scripts.set_phase(Phase::Enqueueing);
        scripts.deregister_script("underscore");
        assert!(!scripts.script_is("underscore", List::Registered));
    }

    #[test]
    fn test_queue_consumed_by_output() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        scripts.register_script("b", Some("/b.js"), &["a"], Version::None, false);
        scripts.enqueue_script("b", None, &[], Version::Auto, false);

        assert_eq!(handles(&scripts.print_scripts(None)), ["a", "b"]);
        assert!(scripts.queue().is_empty());
        assert!(!scripts.script_is("b", List::Enqueued));
        assert!(scripts.script_is("b", List::Registered));
        assert!(scripts.script_is("b", List::Done));
    }

    #[test]
    fn test_missing_reported_once() {
        let mut scripts = ready();
        scripts.enqueue_script("ghost", None, &[], Version::Auto, false);

        assert!(scripts.do_head_items().is_empty());
        assert!(scripts.do_footer_items().is_empty());
        scripts.resolve();

        assert_eq!(
            scripts.notices(),
            [Notice::MissingDependency {
                handle: "ghost".into(),
                missing: "ghost".into()
            }]
        );

        // Never emitted, so still waiting in the queue.
        assert!(scripts.queue().contains("ghost"));
    }

    #[test]
    fn test_front_may_deregister() {
        let mut scripts = ready();
        scripts.register_script("backbone", Some("/backbone.js"), &[], Version::Auto, false);
        scripts.deregister_script("backbone");
        assert!(!scripts.script_is("backbone", List::Registered));
        assert!(scripts.notices().is_empty());
    }

    #[test]
    fn test_too_early() {
        let mut scripts = Scripts::default();
        assert!(scripts.register_script("a", Some("/a.js"), &[], Version::Auto, false));

        let [Notice::DoingItWrong { function, message, .. }] = scripts.notices() else {
            panic!("expected one notice, got {:?}", scripts.notices());
        };
        assert_eq!(*function, "register_script");
        assert!(message.ends_with("This notice was triggered by the a handle."));
    }

    #[test]
    fn test_head_and_footer() {
        let mut scripts = ready();
        scripts.register_script("lib", Some("/lib.js"), &[], Version::None, true);
        scripts.register_script("foot", Some("/foot.js"), &["lib"], Version::None, true);
        scripts.register_script("head", Some("/head.js"), &[], Version::None, false);
        scripts.enqueue_script("foot", None, &[], Version::Auto, false);
        scripts.enqueue_script("head", None, &[], Version::Auto, false);

        let head = scripts.do_head_items();
        assert_eq!(handles(&head), ["head"]);
        assert!(!scripts.script_is("foot", List::Done));
        assert_eq!(scripts.queue().handles(), ["foot"]);

        let footer = scripts.do_footer_items();
        assert_eq!(handles(&footer), ["lib", "foot"]);
        assert!(footer.iter().all(|e| e.group == Group::Footer));
        assert!(scripts.queue().is_empty());
    }

    #[test]
    fn test_head_dependency_of_footer_asset() {
        let mut scripts = ready();
        scripts.register_script("lib", Some("/lib.js"), &[], Version::None, true);
        scripts.register_script("head", Some("/head.js"), &["lib"], Version::None, false);
        scripts.enqueue_script("head", None, &[], Version::Auto, false);

        let head = scripts.do_head_items();
        assert_eq!(handles(&head), ["lib", "head"]);
        assert!(scripts.do_footer_items().is_empty());
    }

    #[test]
    fn test_enqueue_args() {
        let mut scripts = ready();
        scripts.enqueue_script("a?lang=en", Some("/a.js"), &[], Version::explicit("1"), false);

        let emitted = scripts.do_items(None, None);
        assert_eq!(emitted[0].src.as_deref(), Some("/a.js?ver=1&lang=en"));
    }

    #[test]
    fn test_inline_script() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);

        assert!(scripts.add_inline_script("a", "one();", Position::After));
        assert!(scripts.add_inline_script("a", "<script type=\"text/javascript\">two();</script>", Position::After));
        assert!(scripts.add_inline_script("a", "zero();", Position::from("prepend")));
        assert!(!scripts.add_inline_script("a", "", Position::After));
        assert!(!scripts.add_inline_script("nope", "x();", Position::After));

        let asset = scripts.registered("a").unwrap();
        assert_eq!(asset.after, ["one();", "two();"]);
        assert_eq!(asset.before, ["zero();"]);
        assert_eq!(scripts.notices().len(), 1);
    }

    #[test]
    fn test_strip_script_tags() {
        assert_eq!(strip_script_tags("<SCRIPT>a();</Script>"), "a();");
        assert_eq!(strip_script_tags("x <script src=1> a(); </script> y"), "x  a();  y");
        assert_eq!(strip_script_tags(" a(); </script>"), "a(); </script>");
    }

    #[test]
    fn test_localize() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);

        assert!(scripts.localize_script(
            "a",
            "aL10n",
            json!({"count": 3, "on": true, "off": false, "label": "Tom &amp; Jerry", "l10n_print_after": "go()"})
        ));
        assert!(scripts.localize_script("a", "second", json!({"x": "y"})));
        assert!(!scripts.localize_script("nope", "x", json!({})));

        let data = scripts.registry().get_data("a", "data").unwrap();
        assert_eq!(
            data.as_str().unwrap(),
            "var aL10n = {\"count\":\"3\",\"label\":\"Tom & Jerry\",\"off\":\"\",\"on\":\"1\"};\ngo();\nvar second = {\"x\":\"y\"};"
        );
    }

    #[test]
    fn test_localize_array() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);

        assert!(scripts.localize_script("a", "x", json!([1, true, null, {"k": 2}])));
        assert!(scripts.notices().is_empty());
        assert_eq!(
            scripts.registry().get_data("a", "data"),
            Some(&json!("var x = [\"1\",\"1\",null,{\"k\":2}];"))
        );
    }

    #[test]
    fn test_localize_jquery() {
        let mut scripts = ready();
        scripts.register_script("jquery-core", Some("/jquery.js"), &[], Version::None, false);
        assert!(scripts.localize_script("jquery", "j", json!({})));
        assert!(scripts.registry().get_data("jquery-core", "data").is_some());
    }

    #[test]
    fn test_localize_not_object() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        assert!(scripts.localize_script("a", "n", json!(5)));
        assert_eq!(scripts.notices().len(), 1);
        assert_eq!(
            scripts.registry().get_data("a", "data"),
            Some(&json!("var n = 5;"))
        );
    }

    #[test]
    fn test_translations() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        scripts.register_script("wp-i18n", Some("/i18n.js"), &[], Version::None, false);

        assert!(scripts.set_script_translations("a", None, Some("/languages")));
        assert!(scripts.set_script_translations("a", Some("plugin"), None));
        assert!(!scripts.set_script_translations("nope", None, None));

        assert_eq!(scripts.registered("a").unwrap().deps, ["wp-i18n"]);

        scripts.enqueue_script("a", None, &[], Version::Auto, false);
        let emitted = scripts.do_items(None, None);
        assert_eq!(handles(&emitted), ["wp-i18n", "a"]);
        assert_eq!(emitted[1].translations.as_ref().unwrap().domain, "plugin");
    }

    #[test]
    fn test_alias_with_inline_code() {
        let mut scripts = ready();
        scripts.register_script("config", None, &[], Version::None, false);
        scripts.add_inline_script("config", "window.cfg = {};", Position::Before);
        scripts.enqueue_script("config", None, &[], Version::Auto, false);

        let emitted = scripts.do_items(None, None);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].src, None);
        assert_eq!(emitted[0].before, ["window.cfg = {};"]);
    }

    #[test]
    fn test_script_is_lists() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        scripts.register_script("b", Some("/b.js"), &["a"], Version::None, false);
        scripts.enqueue_script("b", None, &[], Version::Auto, false);

        assert!(scripts.script_is("a", List::Enqueued));
        assert!(!scripts.script_is("a", List::ToDo));

        scripts.resolve();
        assert!(scripts.script_is("a", List::ToDo));
        assert!(!scripts.script_is("a", List::Done));

        assert_eq!("printed".parse::<List>(), Ok(List::Done));
        assert_eq!("queue".parse::<List>(), Ok(List::Enqueued));
        assert!("nope".parse::<List>().is_err());
    }

    #[test]
    fn test_cycle_through_facade() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &["b"], Version::None, false);
        scripts.register_script("b", Some("/b.js"), &["c"], Version::None, false);
        scripts.register_script("c", Some("/c.js"), &["a"], Version::None, false);
        scripts.enqueue_script("a", None, &[], Version::Auto, false);

        let emitted = scripts.do_items(None, None);
        assert_eq!(handles(&emitted), ["c", "b", "a"]);
        assert!(scripts.notices().is_empty());
    }

    #[test]
    fn test_print_scripts_empty() {
        let mut scripts = ready();
        scripts.register_script("a", Some("/a.js"), &[], Version::None, false);
        let none: &[&str] = &[];
        assert!(scripts.print_scripts(Some(none)).is_empty());

        let emitted = scripts.print_scripts(Some(&["a"][..]));
        assert_eq!(handles(&emitted), ["a"]);
    }
}

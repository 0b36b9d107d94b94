//! Per-field configuration.
//!
//! `Options` is fully resolved; hosts usually start from a variant's defaults
//! and apply an `OptionsOverride` (typically decoded from JSON). The merge is
//! shallow: a supplied parameter map replaces the default map whole.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::candidate::Candidate;
use crate::transform::Fragment;

/// Query parameters, kept ordered so generated URLs are stable.
pub type Params = BTreeMap<String, Value>;

/// Row filter: `(candidate, trimmed query) -> keep?`
pub type FilterFn = Arc<dyn Fn(&Candidate, &str) -> bool + Send + Sync>;

/// Row renderer: `(candidate, trimmed query) -> fragment`
pub type TransformFn = Arc<dyn Fn(&Candidate, &str) -> Fragment + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// Focus to managed.
    pub manage_delay: Duration,
    /// Blur to released.
    pub release_delay: Duration,
    /// Highlight to flyout fetch.
    pub flyout_delay: Duration,
    /// Grace period before the loading indicator appears.
    pub loading_delay: Duration,
    pub request_timeout: Duration,
    /// How long the timeout indicator stays up.
    pub error_display: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            manage_delay: Duration::from_millis(200),
            release_delay: Duration::from_millis(100),
            flyout_delay: Duration::ZERO,
            loading_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
            error_display: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct Options {
    /// Overlay and flyout width in px.
    pub width: u32,
    /// Don't highlight the first row when a list is shown.
    pub soft_select: bool,
    /// Label of the synthetic "create new" row; `None` hides it.
    pub suggest_new_label: Option<String>,
    pub show_flyout: bool,
    pub service_base_url: String,
    pub search_path: String,
    pub search_params: Params,
    /// Name of the search parameter that carries the typed text.
    pub query_param: String,
    pub blurb_path: String,
    pub blurb_params: Params,
    pub thumbnail_path: String,
    pub thumbnail_params: Params,
    pub mqlread_path: String,
    /// Type enumerated by the select variant.
    pub enum_type: String,
    pub enum_limit: u32,
    pub filter_fn: Option<FilterFn>,
    pub transform_fn: Option<TransformFn>,
    /// Gap between the field and the overlay.
    pub vertical_offset_px: i32,
    pub visible_rows: usize,
    pub timings: Timings,
}

impl Default for Options {
    fn default() -> Self {
        let mut search_params = Params::new();
        search_params.insert("type".into(), Value::from("/common/topic"));
        search_params.insert("start".into(), Value::from(0));
        search_params.insert("limit".into(), Value::from(20));

        let mut blurb_params = Params::new();
        blurb_params.insert("maxlength".into(), Value::from(300));

        Self {
            width: 275,
            soft_select: false,
            suggest_new_label: None,
            show_flyout: true,
            service_base_url: "http://www.freebase.com".into(),
            search_path: "/api/service/search".into(),
            search_params,
            query_param: "query".into(),
            blurb_path: "/api/trans/blurb".into(),
            blurb_params,
            thumbnail_path: "/api/trans/image_thumb".into(),
            thumbnail_params: Params::new(),
            mqlread_path: "/api/service/mqlread".into(),
            enum_type: "/location/us_state".into(),
            enum_limit: 100,
            filter_fn: None,
            transform_fn: None,
            vertical_offset_px: 8,
            visible_rows: 10,
            timings: Timings::default(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("width", &self.width)
            .field("soft_select", &self.soft_select)
            .field("suggest_new_label", &self.suggest_new_label)
            .field("show_flyout", &self.show_flyout)
            .field("service_base_url", &self.service_base_url)
            .field("search_path", &self.search_path)
            .field("search_params", &self.search_params)
            .field("query_param", &self.query_param)
            .field("filter_fn", &self.filter_fn.is_some())
            .field("transform_fn", &self.transform_fn.is_some())
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Apply `overrides` on top of `self`. Maps are replaced, not merged.
    pub fn merged(mut self, overrides: OptionsOverride) -> Self {
        let OptionsOverride {
            width,
            soft_select,
            suggest_new_label,
            show_flyout,
            service_base_url,
            search_path,
            search_params,
            query_param,
            blurb_path,
            blurb_params,
            thumbnail_path,
            thumbnail_params,
            mqlread_path,
            enum_type,
            enum_limit,
            vertical_offset_px,
            visible_rows,
            timings,
            filter_fn,
            transform_fn,
        } = overrides;

        fn set<T>(slot: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *slot = v;
            }
        }

        set(&mut self.width, width);
        set(&mut self.soft_select, soft_select);
        if suggest_new_label.is_some() {
            self.suggest_new_label = suggest_new_label;
        }
        set(&mut self.show_flyout, show_flyout);
        set(&mut self.service_base_url, service_base_url);
        set(&mut self.search_path, search_path);
        set(&mut self.search_params, search_params);
        set(&mut self.query_param, query_param);
        set(&mut self.blurb_path, blurb_path);
        set(&mut self.blurb_params, blurb_params);
        set(&mut self.thumbnail_path, thumbnail_path);
        set(&mut self.thumbnail_params, thumbnail_params);
        set(&mut self.mqlread_path, mqlread_path);
        set(&mut self.enum_type, enum_type);
        set(&mut self.enum_limit, enum_limit);
        set(&mut self.vertical_offset_px, vertical_offset_px);
        set(&mut self.visible_rows, visible_rows.map(|n| n.max(1)));
        if let Some(t) = timings {
            t.apply(&mut self.timings);
        }
        if filter_fn.is_some() {
            self.filter_fn = filter_fn;
        }
        if transform_fn.is_some() {
            self.transform_fn = transform_fn;
        }
        self
    }
}

/// Partial options as a host supplies them.
///
/// Keys are camelCase; the snake_case names used by the old jQuery widgets
/// (`soft`, `suggest_new`, `ac_param`, ..) are accepted as aliases.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsOverride {
    pub width: Option<u32>,
    #[serde(alias = "soft")]
    pub soft_select: Option<bool>,
    #[serde(alias = "suggest_new")]
    pub suggest_new_label: Option<String>,
    #[serde(alias = "flyout")]
    pub show_flyout: Option<bool>,
    #[serde(alias = "service_url")]
    pub service_base_url: Option<String>,
    #[serde(alias = "ac_path")]
    pub search_path: Option<String>,
    #[serde(alias = "ac_param")]
    pub search_params: Option<Params>,
    #[serde(alias = "ac_qstr")]
    pub query_param: Option<String>,
    #[serde(alias = "blurb_path")]
    pub blurb_path: Option<String>,
    #[serde(alias = "blurb_param")]
    pub blurb_params: Option<Params>,
    #[serde(alias = "thumbnail_path")]
    pub thumbnail_path: Option<String>,
    #[serde(alias = "thumbnail_param")]
    pub thumbnail_params: Option<Params>,
    #[serde(alias = "mqlread_path")]
    pub mqlread_path: Option<String>,
    #[serde(alias = "type")]
    pub enum_type: Option<String>,
    #[serde(alias = "limit")]
    pub enum_limit: Option<u32>,
    #[serde(alias = "fudge")]
    pub vertical_offset_px: Option<i32>,
    pub visible_rows: Option<usize>,
    pub timings: Option<TimingsOverride>,
    #[serde(skip)]
    pub filter_fn: Option<FilterFn>,
    #[serde(skip)]
    pub transform_fn: Option<TransformFn>,
}

impl OptionsOverride {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn with_filter(
        mut self,
        f: impl Fn(&Candidate, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_fn = Some(Arc::new(f));
        self
    }

    pub fn with_transform(
        mut self,
        f: impl Fn(&Candidate, &str) -> Fragment + Send + Sync + 'static,
    ) -> Self {
        self.transform_fn = Some(Arc::new(f));
        self
    }
}

/// Timings in milliseconds.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingsOverride {
    pub manage_delay_ms: Option<u64>,
    pub release_delay_ms: Option<u64>,
    pub flyout_delay_ms: Option<u64>,
    pub loading_delay_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub error_display_ms: Option<u64>,
}

impl TimingsOverride {
    fn apply(self, t: &mut Timings) {
        let ms = Duration::from_millis;
        if let Some(v) = self.manage_delay_ms {
            t.manage_delay = ms(v);
        }
        if let Some(v) = self.release_delay_ms {
            t.release_delay = ms(v);
        }
        if let Some(v) = self.flyout_delay_ms {
            t.flyout_delay = ms(v);
        }
        if let Some(v) = self.loading_delay_ms {
            t.loading_delay = ms(v);
        }
        if let Some(v) = self.request_timeout_ms {
            t.request_timeout = ms(v);
        }
        if let Some(v) = self.error_display_ms {
            t.error_display = ms(v);
        }
    }
}

/// Render a parameter value the way it appears in a query string.
pub(crate) fn param_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_service() {
        let o = Options::default();
        assert_eq!(o.width, 275);
        assert!(!o.soft_select);
        assert!(o.show_flyout);
        assert_eq!(o.search_params.get("limit"), Some(&Value::from(20)));
        assert_eq!(o.blurb_params.get("maxlength"), Some(&Value::from(300)));
        assert!(o.thumbnail_params.is_empty());
        assert_eq!(o.timings.manage_delay, Duration::from_millis(200));
    }

    #[test]
    fn merge_replaces_maps_whole() {
        let o = Options::default().merged(
            OptionsOverride::from_json(r#"{"searchParams": {"type": "/film/film"}, "softSelect": true}"#)
                .unwrap(),
        );
        assert!(o.soft_select);
        assert_eq!(o.search_params.len(), 1);
        assert_eq!(o.search_params.get("type"), Some(&Value::from("/film/film")));
        // untouched keys keep their defaults
        assert_eq!(o.query_param, "query");
    }

    #[test]
    fn legacy_option_names_are_accepted() {
        let o = Options::default().merged(
            OptionsOverride::from_json(
                r#"{"soft": true, "suggest_new": "Create new Film", "service_url": "http://localhost:8080", "ac_qstr": "prefix"}"#,
            )
            .unwrap(),
        );
        assert!(o.soft_select);
        assert_eq!(o.suggest_new_label.as_deref(), Some("Create new Film"));
        assert_eq!(o.service_base_url, "http://localhost:8080");
        assert_eq!(o.query_param, "prefix");
    }

    #[test]
    fn timing_overrides_are_in_milliseconds() {
        let o = Options::default().merged(
            OptionsOverride::from_json(r#"{"timings": {"requestTimeoutMs": 1500}}"#).unwrap(),
        );
        assert_eq!(o.timings.request_timeout, Duration::from_millis(1500));
        assert_eq!(o.timings.release_delay, Duration::from_millis(100));
    }

    #[test]
    fn param_text_renders_scalars_bare() {
        assert_eq!(param_text(&Value::from("x y")), "x y");
        assert_eq!(param_text(&Value::from(20)), "20");
        assert_eq!(param_text(&Value::Null), "");
        assert_eq!(param_text(&Value::from(true)), "true");
    }
}

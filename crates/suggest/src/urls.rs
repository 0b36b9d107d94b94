use serde_json::json;
use url::Url;

use crate::error::Result;
use crate::options::{Options, Params, param_text};

/// Turn an id into a path segment.
///
/// Ids that already look like paths (`/film/film`) are used verbatim; anything
/// else (guids, keys) is percent-encoded behind a leading slash.
///
/// ```
/// use suggest::urls::quote_id;
///
/// assert_eq!(quote_id("/en/blade_runner"), "/en/blade_runner");
/// assert_eq!(quote_id("#9202a8c0"), "/%239202a8c0");
/// ```
pub fn quote_id(id: &str) -> String {
    if id.starts_with('/') {
        id.to_string()
    } else {
        format!("/{}", urlencoding::encode(id))
    }
}

pub fn search_url(options: &Options, query: &str) -> Result<Url> {
    let mut params = options.search_params.clone();
    params.insert(options.query_param.clone(), query.into());
    with_params(
        &format!("{}{}", options.service_base_url, options.search_path),
        &params,
    )
}

pub fn blurb_url(options: &Options, article_id: &str) -> Result<Url> {
    with_params(
        &format!(
            "{}{}{}",
            options.service_base_url,
            options.blurb_path,
            quote_id(article_id)
        ),
        &options.blurb_params,
    )
}

pub fn thumbnail_url(options: &Options, image_id: &str) -> Result<Url> {
    with_params(
        &format!(
            "{}{}{}",
            options.service_base_url,
            options.thumbnail_path,
            quote_id(image_id)
        ),
        &options.thumbnail_params,
    )
}

/// Link to the entity's page on the service.
pub fn view_url(options: &Options, id: &str) -> String {
    format!("{}/view{}", options.service_base_url, quote_id(id))
}

/// Enumeration query for the select variant: every instance of
/// `options.enum_type`, sorted by name.
pub fn mqlread_url(options: &Options) -> Result<Url> {
    let queries = json!({
        "query": {
            "query": [{
                "name": null,
                "id": null,
                "sort": "name",
                "type": options.enum_type,
                "limit": options.enum_limit,
            }]
        }
    });
    let mut params = Params::new();
    params.insert("queries".into(), queries.to_string().into());
    with_params(
        &format!("{}{}", options.service_base_url, options.mqlread_path),
        &params,
    )
}

fn with_params(base: &str, params: &Params) -> Result<Url> {
    let mut url = Url::parse(base)?;
    // no trailing '?' when there is nothing to add
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, &param_text(v));
        }
    }
    Ok(url)
}

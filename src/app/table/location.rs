// src/app/table/location.rs
// The table page location: a URL whose query string carries the persisted client state
// (page, filters, hidden columns). Rewrites happen in place, like a history replace.

use super::error::TableError;
use log::{debug, trace};
use reqwest::Url;

/// Query parameter holding the current grid page.
pub const PAGE_PARAM: &str = "page";

/// The page the table lives on.
#[derive(Debug, Clone)]
pub struct PageLocation {
    url: Url,
    pending_navigation: Option<Url>,
    // Bumped on every rewrite so the host knows when to persist.
    revision: u64,
}

impl PageLocation {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            pending_navigation: None,
            revision: 0,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, TableError> {
        Url::parse(raw)
            .map(Self::new)
            .map_err(|e| TableError::invalid_url(raw, e))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All values of a repeated query parameter, in order.
    pub fn values(&self, name: &str) -> Vec<String> {
        self.url
            .query_pairs()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .collect()
    }

    pub fn first(&self, name: &str) -> Option<String> {
        self.values(name).into_iter().next()
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Drops every parameter named in `names` and appends `pairs`; everything else is kept.
    pub fn replace_params<I>(&mut self, names: &[&str], pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query: Vec<(String, String)> = self
            .query_pairs()
            .into_iter()
            .filter(|(key, _)| !names.contains(&key.as_str()))
            .collect();
        query.extend(pairs);
        self.write_query(&query);
        debug!("Location rewritten ({:?}): {}", names, self.url);
    }

    pub fn set_param(&mut self, name: &str, value: &str) {
        self.replace_params(&[name], [(name.to_string(), value.to_string())]);
    }

    fn write_query(&mut self, pairs: &[(String, String)]) {
        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url
                .query_pairs_mut()
                .clear()
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        self.revision += 1;
    }

    /// Resolves a possibly relative target against the page.
    pub fn resolve(&self, target: &str) -> Result<Url, TableError> {
        self.url
            .join(target)
            .map_err(|e| TableError::invalid_url(target, e))
    }

    /// Requests navigation away from the page. The host performs it.
    pub fn navigate(&mut self, target: &str) -> Result<(), TableError> {
        let url = self.resolve(target)?;
        trace!("Navigation requested to {}", url);
        self.pending_navigation = Some(url);
        Ok(())
    }

    pub fn pending_navigation(&self) -> Option<&Url> {
        self.pending_navigation.as_ref()
    }

    pub fn take_navigation(&mut self) -> Option<Url> {
        self.pending_navigation.take()
    }
}

use crate::config::Config;
use fixture_match_core::normalize;

/// Substring gate applied to raw alert text before any resolution work.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    /// (configured term, normalized term)
    whitelist: Vec<(String, String)>,
    blacklist: Vec<(String, String)>,
}

impl AlertFilter {
    pub fn new(whitelist: &[String], blacklist: &[String]) -> Self {
        Self {
            whitelist: prepare(whitelist),
            blacklist: prepare(blacklist),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.alert_whitelist, &cfg.alert_blacklist)
    }

    /// Check if an alert should be resolved. The blacklist wins over the whitelist.
    pub fn should_process(&self, text: &str) -> (bool, Option<String>) {
        let text = normalize(text);

        if let Some((term, _)) = self.blacklist.iter().find(|(_, n)| text.contains(n.as_str())) {
            return (false, Some(format!("blacklisted({})", term)));
        }

        if !self.whitelist.is_empty() && !self.whitelist.iter().any(|(_, n)| text.contains(n.as_str()))
        {
            return (false, Some("not_whitelisted".to_string()));
        }

        (true, None)
    }
}

fn prepare(terms: &[String]) -> Vec<(String, String)> {
    terms
        .iter()
        .map(|t| (t.clone(), normalize(t)))
        .filter(|(_, n)| !n.is_empty())
        .collect()
}

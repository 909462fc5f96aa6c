//! Relationship links attached to every v2 resource

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
}

/// Ids of every link with the given relation, in response order
pub fn ids_by_rel(links: &[Link], rel: &str) -> Vec<String> {
    links
        .iter()
        .filter(|l| l.rel == rel)
        .filter_map(|l| l.id.clone())
        .collect()
}

pub fn find_rel<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|l| l.rel == rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_by_rel() {
        let links: Vec<Link> = serde_json::from_value(json!([
            {"rel": "self", "href": "/v2/antiAffinityPolicies/BTDI/p1", "verbs": ["GET", "PUT", "DELETE"]},
            {"rel": "server", "href": "/v2/servers/BTDI/wa1btdiweb01", "id": "WA1BTDIWEB01"},
            {"rel": "server", "href": "/v2/servers/BTDI/wa1btdiweb02", "id": "WA1BTDIWEB02"},
        ]))
        .unwrap();

        assert_eq!(ids_by_rel(&links, "server"), vec!["WA1BTDIWEB01", "WA1BTDIWEB02"]);
        assert!(ids_by_rel(&links, "group").is_empty());
        assert_eq!(find_rel(&links, "self").unwrap().verbs.len(), 3);
    }
}

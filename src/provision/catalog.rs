//! VM size and image publisher lookups.

use crate::error::Result;
use crate::provider::{CloudProvider, ImagePublisher, Region, VmSize};

/// Returns every size offered in `region`, sorted by name.
pub async fn list_vm_sizes(provider: &dyn CloudProvider, region: &Region) -> Result<Vec<VmSize>> {
    let mut sizes = provider.list_vm_sizes(region).await?;
    sizes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sizes)
}

/// Returns true if `name` contains `filter`, ignoring case and `*`.
///
/// An empty filter, or one made only of `*`, matches everything.
pub fn publisher_matches(name: &str, filter: &str) -> bool {
    let needle: String = filter.chars().filter(|c| *c != '*').collect();
    name.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Returns the publishers in `region` whose name matches `filter`, sorted by
/// name.
pub async fn find_publishers(
    provider: &dyn CloudProvider,
    region: &Region,
    filter: &str,
) -> Result<Vec<ImagePublisher>> {
    let mut publishers: Vec<ImagePublisher> = provider
        .list_publishers(region)
        .await?
        .into_iter()
        .filter(|p| publisher_matches(&p.name, filter))
        .collect();
    publishers.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(publishers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;

    #[test]
    fn test_publisher_matches() {
        assert!(publisher_matches("MicrosoftWindowsServer", "*"));
        assert!(publisher_matches("MicrosoftWindowsServer", ""));
        assert!(publisher_matches("MicrosoftWindowsServer", "*windows*"));
        assert!(publisher_matches("MicrosoftWindowsServer", "Microsoft"));
        assert!(!publisher_matches("Canonical", "Microsoft"));
    }

    #[tokio::test]
    async fn test_sizes_are_sorted() {
        let provider = InMemoryProvider::sample();
        let sizes = list_vm_sizes(&provider, &Region::new("uksouth")).await.unwrap();
        let names: Vec<&str> = sizes.iter().map(|s| s.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_find_publishers_filters_and_sorts() {
        let provider = InMemoryProvider::sample();
        let publishers = find_publishers(&provider, &Region::new("uksouth"), "*microsoft*")
            .await
            .unwrap();
        let names: Vec<&str> = publishers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "MicrosoftSQLServer",
                "MicrosoftWindowsDesktop",
                "MicrosoftWindowsServer"
            ]
        );
    }
}

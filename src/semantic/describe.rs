//! Description generation for embedding input.
//!
//! Turns a structured profile into one natural-language string tuned for
//! retrieval quality:
//! 1. Base sentence (name, category, region, followers, platforms, engagement)
//! 2. Follower-tier clause (mega / macro / micro)
//! 3. Rate-card sentence
//! 4. Free-text description appended verbatim when present
//!
//! Also owns `flatten_metadata`, the one place where the typed profile is
//! lowered to the string-only key/value form index backends accept.

use crate::profiles::Profile;
use std::collections::BTreeMap;

const MEGA_FOLLOWERS: u64 = 1_000_000;
const MACRO_FOLLOWERS: u64 = 100_000;

/// Generate the embedding text for a profile. Pure and deterministic.
pub fn describe(profile: &Profile) -> String {
    let mut text = format!(
        "{} is a {} influencer from {} with {} followers on {} with an engagement rate of {}%.",
        profile.name,
        profile.category,
        profile.region,
        profile.followers,
        profile.platforms.join(", "),
        profile.engagement_rate,
    );

    text.push(' ');
    text.push_str(&tier_clause(profile.followers));

    text.push_str(&format!(" Their rate card is {}.", profile.rate_card));

    if !profile.description.trim().is_empty() {
        text.push(' ');
        text.push_str(profile.description.trim());
    }

    text
}

/// Follower-tier sentence. Integer division keeps `followers == 0` safe ("0K").
fn tier_clause(followers: u64) -> String {
    if followers >= MEGA_FOLLOWERS {
        let millions = followers as f64 / 1_000_000.0;
        format!(
            "They are a mega influencer with over {:.1} million followers.",
            millions
        )
    } else if followers >= MACRO_FOLLOWERS {
        format!(
            "They are a macro influencer with {}K followers.",
            thousands(followers)
        )
    } else {
        format!(
            "They are a micro influencer with {}K followers.",
            thousands(followers)
        )
    }
}

fn thousands(followers: u64) -> u64 {
    (followers as f64 / 1000.0).round() as u64
}

/// Flatten a profile to the scalar-string metadata form the vector index
/// stores. Lists are joined with `", "`, everything else stringified. The
/// typed representation stays intact everywhere else.
pub fn flatten_metadata(profile: &Profile) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();
    meta.insert("id".to_string(), profile.id.to_string());
    meta.insert("name".to_string(), profile.name.clone());
    meta.insert("category".to_string(), profile.category.clone());
    meta.insert("region".to_string(), profile.region.clone());
    meta.insert("contact".to_string(), profile.contact.clone());
    meta.insert("rate_card".to_string(), profile.rate_card.clone());
    meta.insert("description".to_string(), profile.description.clone());
    meta.insert("platforms".to_string(), profile.platforms.join(", "));
    meta.insert("followers".to_string(), profile.followers.to_string());
    meta.insert(
        "engagement_rate".to_string(),
        profile.engagement_rate.to_string(),
    );
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_profile(followers: u64) -> Profile {
        Profile {
            id: 1,
            name: "Priya Sharma".to_string(),
            category: "fashion".to_string(),
            region: "India".to_string(),
            contact: "priya@example.com".to_string(),
            rate_card: "₹50,000 per post".to_string(),
            description: "Sustainable fashion and traditional wear".to_string(),
            platforms: vec!["Instagram".to_string(), "YouTube".to_string()],
            followers,
            engagement_rate: 3.5,
        }
    }

    #[test]
    fn test_describe_deterministic() {
        let profile = test_profile(1_200_000);
        assert_eq!(describe(&profile), describe(&profile));
    }

    #[test]
    fn test_base_sentence() {
        let text = describe(&test_profile(1_200_000));
        assert!(text.starts_with(
            "Priya Sharma is a fashion influencer from India with 1200000 followers \
             on Instagram, YouTube with an engagement rate of 3.5%."
        ));
    }

    #[test]
    fn test_mega_tier() {
        let text = describe(&test_profile(1_200_000));
        assert!(text.contains("mega influencer with over 1.2 million followers"));
    }

    #[test]
    fn test_mega_boundary() {
        let text = describe(&test_profile(1_000_000));
        assert!(text.contains("mega influencer with over 1.0 million followers"));
    }

    #[test]
    fn test_macro_boundary() {
        let text = describe(&test_profile(999_999));
        assert!(text.contains("macro influencer with 1000K followers"));
        assert!(!text.contains("mega"));
    }

    #[test]
    fn test_micro_boundary() {
        let text = describe(&test_profile(99_999));
        assert!(text.contains("micro influencer with 100K followers"));
        assert!(!text.contains("macro influencer"));
    }

    #[test]
    fn test_zero_followers() {
        let text = describe(&test_profile(0));
        assert!(text.contains("micro influencer with 0K followers"));
    }

    #[test]
    fn test_rate_card_sentence() {
        let text = describe(&test_profile(500));
        assert!(text.contains("Their rate card is ₹50,000 per post."));
    }

    #[test]
    fn test_description_appended_verbatim() {
        let text = describe(&test_profile(500));
        assert!(text.ends_with("Sustainable fashion and traditional wear"));
    }

    #[test]
    fn test_empty_description_omitted() {
        let mut profile = test_profile(500);
        profile.description = "   ".to_string();
        let text = describe(&profile);
        assert!(text.ends_with("Their rate card is ₹50,000 per post."));
    }

    #[test]
    fn test_empty_platforms_no_panic() {
        let mut profile = test_profile(500);
        profile.platforms.clear();
        let text = describe(&profile);
        assert!(text.contains("with 500 followers on  with"));
    }

    #[test]
    fn test_flatten_metadata_stringifies() {
        let meta = flatten_metadata(&test_profile(1_200_000));
        assert_eq!(meta.get("id").unwrap(), "1");
        assert_eq!(meta.get("followers").unwrap(), "1200000");
        assert_eq!(meta.get("engagement_rate").unwrap(), "3.5");
        assert_eq!(meta.get("platforms").unwrap(), "Instagram, YouTube");
    }
}

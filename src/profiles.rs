//! Influencer profile data model and the immutable in-process store.
//!
//! Profiles are loaded once at startup, either from `profiles.yaml` under the
//! base path or from the built-in seed set, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,

    pub name: String,
    pub category: String,
    pub region: String,
    pub contact: String,
    pub rate_card: String,
    pub description: String,

    pub platforms: Vec<String>,
    pub followers: u64,
    pub engagement_rate: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("profiles file is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("duplicate profile id {0}")]
    DuplicateId(u64),
}

/// Read-only table of profiles with id lookup.
pub struct ProfileStore {
    profiles: Vec<Profile>,
    by_id: HashMap<u64, usize>,
}

impl ProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ProfileStoreError> {
        let mut by_id = HashMap::with_capacity(profiles.len());
        for (idx, profile) in profiles.iter().enumerate() {
            if by_id.insert(profile.id, idx).is_some() {
                return Err(ProfileStoreError::DuplicateId(profile.id));
            }
        }
        Ok(Self { profiles, by_id })
    }

    /// Load from `profiles.yaml` under `base_path`, falling back to the seed
    /// dataset when the file does not exist.
    pub fn load_with(base_path: &str) -> Result<Self, ProfileStoreError> {
        let path = Path::new(base_path).join("profiles.yaml");
        if !path.exists() {
            log::info!("no profiles.yaml, using built-in seed dataset");
            return Self::new(seed_profiles());
        }

        let raw = std::fs::read_to_string(&path)?;
        let profiles: Vec<Profile> = serde_yml::from_str(&raw)?;
        log::info!("loaded {} profiles from {}", profiles.len(), path.display());
        Self::new(profiles)
    }

    pub fn all(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, id: u64) -> Option<&Profile> {
        self.by_id.get(&id).map(|idx| &self.profiles[*idx])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn profile(
    id: u64,
    name: &str,
    platforms: &[&str],
    category: &str,
    followers: u64,
    engagement_rate: f32,
    region: &str,
    rate_card: &str,
    contact: &str,
    description: &str,
) -> Profile {
    Profile {
        id,
        name: name.to_string(),
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
        category: category.to_string(),
        followers,
        engagement_rate,
        region: region.to_string(),
        rate_card: rate_card.to_string(),
        contact: contact.to_string(),
        description: description.to_string(),
    }
}

/// Built-in dataset used when no profiles file is present.
pub fn seed_profiles() -> Vec<Profile> {
    vec![
        profile(
            1,
            "Priya Sharma",
            &["Instagram", "YouTube"],
            "fashion",
            1_200_000,
            3.5,
            "India",
            "₹50,000 per post, ₹150,000 per video",
            "priya.sharma@influencer.com",
            "Fashion influencer specializing in sustainable fashion and Indian traditional wear",
        ),
        profile(
            2,
            "Alex Johnson",
            &["TikTok", "Instagram"],
            "fitness",
            850_000,
            4.2,
            "USA",
            "$3,000 per post, $8,000 per video",
            "alex@fitnesswithaj.com",
            "Fitness trainer sharing workout routines and nutrition tips",
        ),
        profile(
            3,
            "Raj Patel",
            &["YouTube", "Twitter"],
            "tech",
            2_000_000,
            2.8,
            "India",
            "₹100,000 per video, ₹30,000 per tweet",
            "raj@techreviews.in",
            "Tech reviewer covering smartphones, laptops, and gadgets with focus on Indian market",
        ),
        profile(
            4,
            "Emma Wilson",
            &["Instagram", "Blog"],
            "beauty",
            1_500_000,
            5.1,
            "UK",
            "£2,500 per post, £5,000 for sponsored blog",
            "emma@beautyblog.uk",
            "Beauty blogger specializing in skincare routines and makeup tutorials",
        ),
        profile(
            5,
            "Vikram Singh",
            &["Instagram", "YouTube"],
            "travel",
            950_000,
            3.9,
            "India",
            "₹40,000 per post, ₹120,000 per video",
            "vikram@traveldiaries.in",
            "Travel vlogger showcasing hidden gems across India and Southeast Asia",
        ),
        profile(
            6,
            "Sarah Chen",
            &["YouTube", "Instagram", "Twitch"],
            "gaming",
            3_000_000,
            4.5,
            "USA",
            "$5,000 per post, $10,000 per stream",
            "sarah@gamingwithsarah.com",
            "Gaming streamer and content creator focusing on RPGs and strategy games",
        ),
        profile(
            7,
            "Aditya Mehta",
            &["Instagram", "LinkedIn"],
            "business",
            500_000,
            2.3,
            "India",
            "₹80,000 per post, ₹200,000 per webinar",
            "aditya@startupmentor.in",
            "Entrepreneur and business coach sharing startup advice and market insights",
        ),
        profile(
            8,
            "Maria Rodriguez",
            &["Instagram", "TikTok", "YouTube"],
            "food",
            1_800_000,
            6.2,
            "Mexico",
            "$4,000 per post, $7,500 per video",
            "maria@deliciosorecipes.com",
            "Chef and food influencer sharing authentic Mexican recipes and cooking techniques",
        ),
    ]
}

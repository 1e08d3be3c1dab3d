//! Pin model and the shared ownership/like rules.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::user::AuthContext;
use crate::util::new_id;

/// Layout ratios are drawn from `[1.0, 1.5)` for locally created pins.
const HEIGHT_RATIO_BASE: f64 = 1.0;
const HEIGHT_RATIO_SPREAD: f64 = 0.5;

/// A single shared image post.
///
/// `user_id` of `None` marks an unclaimed/system pin that only an admin may
/// modify. `liked_by` has set semantics: the same user id never appears
/// twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_by: Option<Vec<String>>,
}

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

impl Pin {
    /// Build a locally owned pin with a fresh id, an empty liker set, and a
    /// randomized layout ratio.
    #[must_use]
    pub fn new_local(title: impl Into<String>, image_url: impl Into<String>, owner: &AuthContext) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            image_url: image_url.into(),
            author: owner.username.clone(),
            user_id: Some(owner.user_id.clone()),
            height_ratio: Some(random_height_ratio()),
            liked_by: Some(Vec::new()),
        }
    }

    /// The ownership/admin authorization rule for update and delete,
    /// written once and shared by both operating modes.
    #[must_use]
    pub fn can_be_modified_by(&self, ctx: &AuthContext) -> bool {
        ctx.is_admin() || self.user_id.as_deref() == Some(ctx.user_id.as_str())
    }

    /// Liker ids, treating an absent array as empty.
    #[must_use]
    pub fn likers(&self) -> &[String] {
        self.liked_by.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likers().iter().any(|id| id == user_id)
    }

    /// Toggle the given user's like: remove the id when present, add it
    /// otherwise. Two consecutive toggles by the same user restore the
    /// original liker set.
    pub fn toggle_like(&mut self, user_id: &str) -> LikeToggle {
        let liked_by = self.liked_by.get_or_insert_with(Vec::new);
        if let Some(position) = liked_by.iter().position(|id| id == user_id) {
            liked_by.remove(position);
            LikeToggle::Unliked
        } else {
            liked_by.push(user_id.to_string());
            LikeToggle::Liked
        }
    }
}

fn random_height_ratio() -> f64 {
    HEIGHT_RATIO_BASE + rand::thread_rng().gen::<f64>() * HEIGHT_RATIO_SPREAD
}

/// Fixed example pins used to seed an empty local store on first use.
#[must_use]
pub fn initial_pins() -> Vec<Pin> {
    let seeds: [(&str, &str, &str, f64); 7] = [
        ("Cozy Reading Corner", "https://picsum.photos/400/600?random=1", "InteriorDaily", 1.5),
        ("Mountain Hiking", "https://picsum.photos/400/400?random=2", "AdventureTime", 1.0),
        ("Healthy Breakfast", "https://picsum.photos/400/550?random=3", "FoodieLife", 1.375),
        ("Abstract Art", "https://picsum.photos/400/300?random=4", "ArtGallery", 0.75),
        ("Urban Photography", "https://picsum.photos/400/500?random=5", "CitySnaps", 1.25),
        ("Minimalist Desk", "https://picsum.photos/400/450?random=6", "TechSetup", 1.125),
        ("Forest Path", "https://picsum.photos/400/650?random=7", "NatureLovers", 1.625),
    ];

    seeds
        .iter()
        .enumerate()
        .map(|(index, (title, image_url, author, ratio))| Pin {
            id: (index + 1).to_string(),
            title: (*title).to_string(),
            image_url: (*image_url).to_string(),
            author: (*author).to_string(),
            user_id: None,
            height_ratio: Some(*ratio),
            liked_by: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::user::Role;

    fn ctx(user_id: &str, role: Role) -> AuthContext {
        AuthContext {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            role,
        }
    }

    fn sample_pin(owner: Option<&str>) -> Pin {
        Pin {
            id: "p1".to_string(),
            title: "Sunset".to_string(),
            image_url: "data:image/png;base64,AA==".to_string(),
            author: "alice".to_string(),
            user_id: owner.map(ToString::to_string),
            height_ratio: Some(1.25),
            liked_by: None,
        }
    }

    #[test]
    fn toggle_like_is_a_true_toggle() {
        let mut pin = sample_pin(Some("alice"));
        assert_eq!(pin.toggle_like("bob"), LikeToggle::Liked);
        assert!(pin.is_liked_by("bob"));
        assert_eq!(pin.toggle_like("bob"), LikeToggle::Unliked);
        assert!(!pin.is_liked_by("bob"));
        assert_eq!(pin.likers(), &[] as &[String]);
    }

    #[test]
    fn toggle_like_never_duplicates_ids() {
        let mut pin = sample_pin(Some("alice"));
        for _ in 0..5 {
            pin.toggle_like("bob");
        }
        let bobs = pin.likers().iter().filter(|id| *id == "bob").count();
        assert!(bobs <= 1);
    }

    #[test]
    fn owner_and_admin_may_modify() {
        let pin = sample_pin(Some("alice"));
        assert!(pin.can_be_modified_by(&ctx("alice", Role::User)));
        assert!(pin.can_be_modified_by(&ctx("mallory", Role::Admin)));
        assert!(!pin.can_be_modified_by(&ctx("mallory", Role::User)));
    }

    #[test]
    fn unclaimed_pin_is_admin_only() {
        let pin = sample_pin(None);
        assert!(pin.can_be_modified_by(&ctx("root", Role::Admin)));
        assert!(!pin.can_be_modified_by(&ctx("alice", Role::User)));
    }

    #[test]
    fn new_local_starts_with_empty_liker_set() {
        let pin = Pin::new_local("Sunset", "data:image/png;base64,AA==", &ctx("alice", Role::User));
        assert_eq!(pin.user_id.as_deref(), Some("alice"));
        assert_eq!(pin.likers(), &[] as &[String]);
        let ratio = pin.height_ratio.unwrap();
        assert!((1.0..1.5).contains(&ratio));
    }

    #[test]
    fn local_ids_are_unique() {
        let actor = ctx("alice", Role::User);
        let a = Pin::new_local("a", "data:,", &actor);
        let b = Pin::new_local("b", "data:,", &actor);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn initial_pins_are_unclaimed() {
        let pins = initial_pins();
        assert_eq!(pins.len(), 7);
        assert!(pins.iter().all(|pin| pin.user_id.is_none()));
    }

    #[test]
    fn pin_round_trips_field_for_field() {
        let pin = sample_pin(Some("alice"));
        let decoded: Pin = serde_json::from_str(&serde_json::to_string(&pin).unwrap()).unwrap();
        assert_eq!(pin, decoded);
    }

    #[test]
    fn pin_wire_names_are_camel_case() {
        let serialized = serde_json::to_string(&sample_pin(Some("alice"))).unwrap();
        assert!(serialized.contains("\"imageUrl\""));
        assert!(serialized.contains("\"userId\""));
        assert!(serialized.contains("\"heightRatio\""));
    }
}

use crate::decklist::ItemName;
use std::fmt;

/// Which face of a card an image shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    /// Marker appended to the item name before it is turned into a file name.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            Side::Front => "",
            Side::Back => "_back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

/// A resolved image location for one face of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub name: ItemName,
    pub side: Side,
    pub url: String,
}

/// Image URLs found for an item. Either face may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFaces {
    pub front: Option<String>,
    pub back: Option<String>,
}

impl CardFaces {
    /// The downloads this item contributes, in fetch order: back first, then
    /// front. Without a front image the item contributes nothing at all.
    pub fn image_refs(&self, name: &ItemName) -> Vec<ImageRef> {
        let Some(front) = &self.front else {
            return Vec::new();
        };

        let mut refs = Vec::with_capacity(2);
        if let Some(back) = &self.back {
            refs.push(ImageRef {
                name: name.clone(),
                side: Side::Back,
                url: back.clone(),
            });
        }
        refs.push(ImageRef {
            name: name.clone(),
            side: Side::Front,
            url: front.clone(),
        });
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    #[test]
    fn test_back_is_fetched_before_front() {
        let faces = CardFaces {
            front: Some("https://img.test/front.jpg".to_string()),
            back: Some("https://img.test/back.jpg".to_string()),
        };

        let refs = faces.image_refs(&name("Delver of Secrets"));
        let sides: Vec<Side> = refs.iter().map(|r| r.side).collect();
        assert_eq!(sides, vec![Side::Back, Side::Front]);
        assert_eq!(refs[0].url, "https://img.test/back.jpg");
        assert_eq!(refs[1].url, "https://img.test/front.jpg");
    }

    #[test]
    fn test_front_only() {
        let faces = CardFaces {
            front: Some("https://img.test/front.jpg".to_string()),
            back: None,
        };
        let refs = faces.image_refs(&name("Island"));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].side, Side::Front);
    }

    #[test]
    fn test_back_without_front_contributes_nothing() {
        let faces = CardFaces {
            front: None,
            back: Some("https://img.test/back.jpg".to_string()),
        };
        assert!(faces.image_refs(&name("Orphaned Back")).is_empty());
    }

    #[test]
    fn test_side_suffixes() {
        assert_eq!(Side::Front.name_suffix(), "");
        assert_eq!(Side::Back.name_suffix(), "_back");
        assert_eq!(Side::Back.to_string(), "back");
    }
}

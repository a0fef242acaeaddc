use crate::fetch::FetchedImage;
use log::warn;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Two different item names that were saved under the same file name; the
/// later download replaced the earlier file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub file_name: String,
    pub first: String,
    pub second: String,
}

#[derive(Debug, Default)]
struct Inner {
    images: Vec<FetchedImage>,
    owners: HashMap<String, String>,
    collisions: Vec<NameCollision>,
}

/// Images fetched so far, in completion order. Shared by all fetch tasks.
#[derive(Debug, Default)]
pub struct ResultSet {
    inner: Mutex<Inner>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one image. Repeating the same item name is legitimate (several
    /// copies of a card); distinct names sharing a file name are reported.
    pub fn push(&self, image: FetchedImage) {
        let mut inner = self.lock();
        match inner.owners.get(&image.file_name) {
            Some(owner) if *owner != image.name => {
                warn!(
                    "'{}' and '{}' are both saved as {}; the earlier file was overwritten",
                    owner, image.name, image.file_name
                );
                let collision = NameCollision {
                    file_name: image.file_name.clone(),
                    first: owner.clone(),
                    second: image.name.clone(),
                };
                inner.collisions.push(collision);
            }
            Some(_) => {}
            None => {
                inner
                    .owners
                    .insert(image.file_name.clone(), image.name.clone());
            }
        }
        inner.images.push(image);
    }

    pub fn len(&self) -> usize {
        self.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the images gathered so far, in completion order.
    pub fn snapshot(&self) -> Vec<FetchedImage> {
        self.lock().images.clone()
    }

    pub fn collisions(&self) -> Vec<NameCollision> {
        self.lock().collisions.clone()
    }

    pub fn into_images(self) -> Vec<FetchedImage> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .images
    }
}

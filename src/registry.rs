//! Read-only list of projects injected by the static build.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Image reference as emitted by the build: either a bare URL or `{ src, alt }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Url(String),
    Described {
        src: String,
        #[serde(default)]
        alt: Option<String>,
    },
}

impl MediaRef {
    pub fn src(&self) -> &str {
        match self {
            MediaRef::Url(src) => src,
            MediaRef::Described { src, .. } => src,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub images: Vec<MediaRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Project {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            images: Vec::new(),
            tags: Vec::new(),
            year: None,
            date: None,
            company: None,
            description: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images
            .into_iter()
            .map(|src| MediaRef::Url(src.into()))
            .collect();
        self
    }

    /// First image, conventionally the cover.
    pub fn hero(&self) -> Option<&MediaRef> {
        self.images.first()
    }

    pub fn display_title(&self) -> String {
        self.title.to_uppercase()
    }
}

/// Slug used when a record arrives without one.
pub fn slug_from_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(year)) => Some(year),
        Some(Raw::Float(year)) => Some(year as i32),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

#[derive(Clone, Debug, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
    by_slug: HashMap<String, usize>,
}

impl ProjectRegistry {
    pub fn new(projects: Vec<Project>) -> Result<Self> {
        let mut by_slug = HashMap::with_capacity(projects.len());
        let mut projects = projects;
        for (index, project) in projects.iter_mut().enumerate() {
            if project.slug.trim().is_empty() {
                project.slug = slug_from_title(&project.title);
            }
            if by_slug.insert(project.slug.clone(), index).is_some() {
                return Err(Error::DuplicateSlug(project.slug.clone()));
            }
        }
        Ok(Self { projects, by_slug })
    }

    pub fn get(&self, slug: &str) -> Option<&Project> {
        self.by_slug.get(slug).map(|&index| &self.projects[index])
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn hero(&self, slug: &str) -> Option<&MediaRef> {
        self.get(slug).and_then(Project::hero)
    }

    /// Previous and next project in registry order.
    pub fn neighbors(&self, slug: &str) -> (Option<&Project>, Option<&Project>) {
        let Some(&index) = self.by_slug.get(slug) else {
            return (None, None);
        };
        let prev = index.checked_sub(1).and_then(|i| self.projects.get(i));
        let next = self.projects.get(index + 1);
        (prev, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_slugs() {
        let err = ProjectRegistry::new(vec![Project::new("a", "A"), Project::new("a", "Again")])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSlug(slug) if slug == "a"));
    }

    #[test]
    fn missing_slug_falls_back_to_title() {
        let registry = ProjectRegistry::new(vec![Project::new("", "Crack at  Nowhere")]).unwrap();
        assert!(registry.contains("crack-at-nowhere"));
    }

    #[test]
    fn builder_sets_tags_and_hero() {
        let project = Project::new("tide", "Tide")
            .with_tags(["Installation", "light"])
            .with_images(["cover.jpg", "detail.jpg"]);
        assert_eq!(project.tags, vec!["Installation", "light"]);
        assert_eq!(project.hero().map(MediaRef::src), Some("cover.jpg"));

        let registry = ProjectRegistry::new(vec![project, Project::new("bare", "Bare")]).unwrap();
        assert_eq!(registry.hero("tide"), Some(&MediaRef::Url("cover.jpg".into())));
        assert_eq!(registry.hero("bare"), None);
    }

    #[test]
    fn neighbors_follow_registry_order() {
        let registry = ProjectRegistry::new(vec![
            Project::new("a", "A"),
            Project::new("b", "B"),
            Project::new("c", "C"),
        ])
        .unwrap();

        let (prev, next) = registry.neighbors("a");
        assert!(prev.is_none());
        assert_eq!(next.map(|p| p.slug.as_str()), Some("b"));

        let (prev, next) = registry.neighbors("c");
        assert_eq!(prev.map(|p| p.slug.as_str()), Some("b"));
        assert!(next.is_none());

        assert_eq!(registry.neighbors("zzz"), (None, None));
    }

    #[test]
    fn decodes_build_snapshot_shapes() {
        let raw = r#"[
            {"slug": "eastern-city-portal", "title": "Eastern City Portal",
             "images": ["a.jpg", {"src": "b.jpg", "alt": "Portal"}],
             "tags": ["installation", "mixed reality"], "year": "2024"},
            {"slug": "crack", "title": "Crack", "year": 2022,
             "date": "2022-05-01T00:00:00.000Z"}
        ]"#;
        let projects: Vec<Project> = serde_json::from_str(raw).unwrap();
        let registry = ProjectRegistry::new(projects).unwrap();

        let portal = registry.get("eastern-city-portal").unwrap();
        assert_eq!(portal.year, Some(2024));
        assert_eq!(registry.hero("eastern-city-portal").map(MediaRef::src), Some("a.jpg"));
        assert_eq!(portal.images[1].src(), "b.jpg");

        let crack = registry.get("crack").unwrap();
        assert_eq!(crack.year, Some(2022));
        assert!(crack.tags.is_empty());
        assert_eq!(crack.display_title(), "CRACK");
    }
}

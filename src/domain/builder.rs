//! Deterministic map generation
//!
//! Turns document text into a [`Model`] without any external service:
//!
//! 1. Detect a heading outline; with fewer than 3 categories the fixed
//!    default vocabulary is used instead
//! 2. Rank keywords once and hand them out through a shared cursor
//! 3. Fill each category with 2-6 items from detected titles, then keywords,
//!    then category defaults, then synthesized `<Title> Support <n>` names
//! 4. Optionally assign one stage per category by linear interpolation
//! 5. Point every item at the first two items of the next category
//!
//! Every step has a fallback, so generation never fails.

use std::collections::HashSet;
use std::path::PathBuf;

use super::id::{normalize, slugify, IdAllocator};
use super::keywords::{extract_keywords, title_case, KeywordCursor, DEFAULT_KEYWORD_LIMIT};
use super::model::{Category, Item, MapOutput, Model, MAX_ITEMS, MAX_STAGE, MIN_ITEMS, MIN_STAGE};
use super::outline::{extract_outline, OutlineCategory};
use super::summary::{derive_abstract, derive_title};

/// Fewest detected categories needed to use the outline
const MIN_OUTLINE_CATEGORIES: usize = 3;

/// Most categories taken from the outline
const MAX_CATEGORIES: usize = 6;

/// Item count used when a category has no detected titles
const DEFAULT_ITEM_TARGET: usize = 3;

/// Number of next-category items each item depends on
const DEPS_PER_ITEM: usize = 2;

/// Clause appended to the Target model's abstract in series mode
pub const TARGET_ABSTRACT_CLAUSE: &str = " with a focus on future-state enablement.";

/// A category of the fixed default vocabulary
#[derive(Debug, Clone, Copy)]
pub struct DefaultCategory {
    pub id: &'static str,
    pub title: &'static str,
    pub items: &'static [&'static str],
}

/// Categories used when the document has no usable outline
pub const DEFAULT_CATEGORIES: &[DefaultCategory] = &[
    DefaultCategory {
        id: "user-value",
        title: "User Value",
        items: &["Outcomes", "Self-Service", "Trust"],
    },
    DefaultCategory {
        id: "experience",
        title: "Experience",
        items: &["UI Portal", "API Access", "Notifications"],
    },
    DefaultCategory {
        id: "capabilities",
        title: "Core Capabilities",
        items: &["Core Processing", "Policy Engine", "Workflow Automation"],
    },
    DefaultCategory {
        id: "platform",
        title: "Platform Services",
        items: &["Monitoring", "Identity", "Orchestration"],
    },
    DefaultCategory {
        id: "infrastructure",
        title: "Infrastructure",
        items: &["Compute", "Storage", "Networking"],
    },
];

/// Default item names for a category title, matched by id or title slug
fn default_items_for(category_title: &str) -> &'static [&'static str] {
    let slug = slugify(category_title);
    DEFAULT_CATEGORIES
        .iter()
        .find(|c| c.id == slug || slugify(c.title) == slug)
        .map(|c| c.items)
        .unwrap_or(&[])
}

/// Request handed to the generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapRequest {
    /// Document text
    pub text: String,
    /// File the text was read from, used for the title fallback
    pub file_path: Option<PathBuf>,
    /// Emit a Current/Target pair instead of a single model
    pub want_series: bool,
    /// Annotate items with a 1-4 stage
    pub want_stage_model: bool,
}

impl MapRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn series(mut self, want_series: bool) -> Self {
        self.want_series = want_series;
        self
    }

    pub fn stage_model(mut self, want_stage_model: bool) -> Self {
        self.want_stage_model = want_stage_model;
        self
    }

    /// Title hint derived from the text and file name
    pub fn title_hint(&self) -> String {
        derive_title(&self.text, self.file_path.as_deref())
    }
}

/// Generates the output for a request
pub fn generate(request: &MapRequest) -> MapOutput {
    let title_hint = request.title_hint();
    if request.want_series {
        MapOutput::Series(generate_series(
            &request.text,
            &title_hint,
            request.want_stage_model,
        ))
    } else {
        MapOutput::Single(generate_model(
            &request.text,
            &title_hint,
            request.want_stage_model,
        ))
    }
}

/// Label of a model within a series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesLabel {
    Current,
    Target,
}

impl SeriesLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesLabel::Current => "Current",
            SeriesLabel::Target => "Target",
        }
    }

    /// Renames a freshly generated model for this position in the series
    fn apply(self, model: &mut Model, title_hint: &str) {
        model.id = format!("{}-{}", model.id, slugify(self.as_str()));
        model.title = format!("{} Blockscape ({})", title_hint, self.as_str());
        if self == SeriesLabel::Target {
            model.abstract_text = format!(
                "{}{}",
                model.abstract_text.trim_end_matches('.'),
                TARGET_ABSTRACT_CLAUSE
            );
        }
    }
}

/// Generates the Current and Target models
///
/// Both are built from the same text; only id, title and the Target
/// abstract differ.
pub fn generate_series(text: &str, title_hint: &str, want_stage_model: bool) -> [Model; 2] {
    [SeriesLabel::Current, SeriesLabel::Target].map(|label| {
        let mut model = generate_model(text, title_hint, want_stage_model);
        label.apply(&mut model, title_hint);
        model
    })
}

/// Generates a single model
pub fn generate_model(text: &str, title_hint: &str, want_stage_model: bool) -> Model {
    let outline = extract_outline(text);
    let mut builder = ModelBuilder::new(extract_keywords(text, DEFAULT_KEYWORD_LIMIT));

    let mut categories = if outline.len() >= MIN_OUTLINE_CATEGORIES {
        builder.outline_categories(&outline)
    } else {
        builder.default_categories()
    };

    if want_stage_model {
        assign_stages(&mut categories);
    }
    assign_deps(&mut categories);

    Model {
        id: slugify(title_hint),
        title: format!("{} Blockscape", title_hint),
        abstract_text: derive_abstract(text, title_hint),
        categories,
    }
}

/// Per-build state: id scopes, used names and the keyword cursor
struct ModelBuilder {
    category_ids: IdAllocator,
    item_ids: IdAllocator,
    used_words: HashSet<String>,
    keywords: KeywordCursor,
}

impl ModelBuilder {
    fn new(keywords: Vec<String>) -> Self {
        Self {
            category_ids: IdAllocator::new(),
            item_ids: IdAllocator::new(),
            used_words: HashSet::new(),
            keywords: KeywordCursor::new(keywords),
        }
    }

    fn outline_categories(&mut self, outline: &[OutlineCategory]) -> Vec<Category> {
        outline
            .iter()
            .take(MAX_CATEGORIES)
            .map(|section| Category {
                id: self.category_ids.allocate(&section.title),
                title: section.title.clone(),
                items: self.build_items(&section.title, &section.items),
            })
            .collect()
    }

    fn default_categories(&mut self) -> Vec<Category> {
        DEFAULT_CATEGORIES
            .iter()
            .map(|default| {
                self.category_ids.reserve(default.id);
                let titles: Vec<String> = default.items.iter().map(|s| s.to_string()).collect();
                Category {
                    id: default.id.to_string(),
                    title: default.title.to_string(),
                    items: self.build_items(default.title, &titles),
                }
            })
            .collect()
    }

    /// Marks a name's slug as used; false if empty or already taken
    fn claim(&mut self, name: &str) -> bool {
        let slug = normalize(name);
        !slug.is_empty() && self.used_words.insert(slug)
    }

    fn push_item(&mut self, items: &mut Vec<Item>, name: String) {
        let id = self.item_ids.allocate(&name);
        items.push(Item::new(id, name));
    }

    fn build_items(&mut self, category_title: &str, item_titles: &[String]) -> Vec<Item> {
        let base = if item_titles.is_empty() {
            DEFAULT_ITEM_TARGET
        } else {
            item_titles.len()
        };
        let target = base.clamp(MIN_ITEMS, MAX_ITEMS);
        let mut items = Vec::with_capacity(target);

        for title in item_titles {
            if items.len() >= target {
                break;
            }
            let name = title.trim();
            if self.claim(name) {
                self.push_item(&mut items, name.to_string());
            }
        }

        while items.len() < target {
            let Some(keyword) = self.keywords.next_keyword().map(str::to_string) else {
                break;
            };
            let name = title_case(&keyword);
            if self.claim(&name) {
                self.push_item(&mut items, name);
            }
        }

        for fallback in default_items_for(category_title) {
            if items.len() >= target {
                break;
            }
            if self.claim(fallback) {
                self.push_item(&mut items, fallback.to_string());
            }
        }

        while items.len() < target {
            let name = format!("{} Support {}", category_title, items.len() + 1);
            self.used_words.insert(slugify(&name));
            self.push_item(&mut items, name);
        }

        items
    }
}

/// Stage for the category at `index` out of `count`
pub fn stage_for(index: usize, count: usize) -> u8 {
    if count <= 1 {
        return MIN_STAGE;
    }
    let ratio = index as f64 / (count - 1) as f64;
    let stage = 1 + (ratio * 3.0).round() as i64;
    stage.clamp(MIN_STAGE as i64, MAX_STAGE as i64) as u8
}

fn assign_stages(categories: &mut [Category]) {
    let count = categories.len();
    for (index, category) in categories.iter_mut().enumerate() {
        let stage = stage_for(index, count);
        for item in &mut category.items {
            item.stage = Some(stage);
        }
    }
}

fn assign_deps(categories: &mut [Category]) {
    let next_ids: Vec<Vec<String>> = (0..categories.len())
        .map(|idx| {
            categories
                .get(idx + 1)
                .map(|next| next.leading_ids(DEPS_PER_ITEM))
                .unwrap_or_default()
        })
        .collect();

    for (category, deps) in categories.iter_mut().zip(next_ids) {
        for item in &mut category.items {
            item.deps = deps.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::is_valid_slug;
    use crate::domain::summary::{fallback_abstract, DEFAULT_TITLE};

    fn names(category: &Category) -> Vec<&str> {
        category.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn empty_text_uses_default_vocabulary() {
        let model = generate_model("", DEFAULT_TITLE, false);

        assert_eq!(model.id, "blockscape-map");
        assert_eq!(model.title, "Blockscape Map Blockscape");
        assert_eq!(model.abstract_text, fallback_abstract(DEFAULT_TITLE));
        assert_eq!(model.categories.len(), 5);

        for (category, default) in model.categories.iter().zip(DEFAULT_CATEGORIES) {
            assert_eq!(category.id, default.id);
            assert_eq!(category.title, default.title);
            assert_eq!(names(category), default.items.to_vec());
            assert!(category.items.iter().all(|i| i.stage.is_none()));
        }
    }

    #[test]
    fn outline_with_bullets() {
        let text = "# Report\n\n## Intake\n- Forms\n- Email\n\n## Review\n- Triage\n- Scoring\n\n## Delivery\n- Portal\n- Export\n";
        let model = generate_model(text, "Report", false);

        let titles: Vec<_> = model.categories.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Intake", "Review", "Delivery"]);
        assert_eq!(names(&model.categories[0]), vec!["Forms", "Email"]);
        assert_eq!(names(&model.categories[2]), vec!["Portal", "Export"]);
        assert_eq!(model.categories[1].id, "review");
    }

    #[test]
    fn duplicate_slug_names_are_skipped() {
        let text = "## Alpha\n- API Access\n- api-access\n## Beta\n- b1\n- b2\n## Gamma\n- g1\n- g2\n";
        let model = generate_model(text, "Dup", false);

        let alpha = &model.categories[0];
        assert_eq!(names(alpha), vec!["API Access", "Access"]);
        assert_eq!(alpha.items[0].id, "api-access");
        assert_eq!(alpha.items[1].id, "access");
    }

    #[test]
    fn keywords_not_reused_across_categories() {
        let text = "## One\n## Two\n## Three\nledger ledger ledger audit audit billing";
        let model = generate_model(text, "Finance", false);

        let mut all: Vec<&str> = model.items().map(|i| i.name.as_str()).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);

        assert_eq!(names(&model.categories[0]), vec!["Ledger", "Audit", "Billing"]);
    }

    #[test]
    fn used_keywords_are_consumed_not_retried() {
        let text = "## Payments\n### Billing\n### Audit\n## Reports\nbilling billing billing ledger ledger\n## Exports\n";
        let model = generate_model(text, "Finance", false);

        assert_eq!(names(&model.categories[0]), vec!["Billing", "Audit"]);
        // billing and audit are already item names; the cursor passes them by
        assert_eq!(
            names(&model.categories[1]),
            vec!["Ledger", "Exports", "Payments"]
        );
        assert_eq!(
            names(&model.categories[2]),
            vec!["Reports", "Exports Support 2", "Exports Support 3"]
        );
        assert_eq!(model.categories[2].items[1].id, "exports-support-2");
    }

    #[test]
    fn synthesized_names_fill_remaining_slots() {
        let model = generate_model("## Aa\n## Bb\n## Cc\n", "X", false);
        assert_eq!(
            names(&model.categories[0]),
            vec!["Aa Support 1", "Aa Support 2", "Aa Support 3"]
        );
        assert_eq!(model.categories[1].items[0].id, "bb-support-1");
    }

    #[test]
    fn category_defaults_used_after_keywords() {
        let model = generate_model("## Experience\n## Infrastructure\n## Zz\n", "X", false);
        assert_eq!(
            names(&model.categories[0]),
            vec!["Experience", "Infrastructure", "UI Portal"]
        );
        assert_eq!(names(&model.categories[1]), vec!["Compute", "Storage", "Networking"]);
    }

    #[test]
    fn item_count_clamped() {
        let mut text = String::from("## A\n");
        for i in 0..10 {
            text.push_str(&format!("### Sub {}\n", i));
        }
        text.push_str("## B\n- one\n## C\n- solo\n");
        let model = generate_model(&text, "X", false);

        assert_eq!(model.categories[0].items.len(), 6);
        assert_eq!(model.categories[1].items.len(), 2);
        assert_eq!(model.categories[2].items.len(), 2);
    }

    #[test]
    fn outline_capped_at_six_categories() {
        let text: String = (0..9).map(|i| format!("# Part {}\n", i)).collect();
        let model = generate_model(&text, "X", false);
        assert_eq!(model.categories.len(), 6);
    }

    #[test]
    fn stages_interpolate_across_categories() {
        let model = generate_model("", DEFAULT_TITLE, true);
        let stages: Vec<u8> = model
            .categories
            .iter()
            .map(|c| c.items[0].stage.unwrap())
            .collect();
        assert_eq!(stages, vec![1, 2, 3, 3, 4]);

        for category in &model.categories {
            let first = category.items[0].stage;
            assert!(category.items.iter().all(|i| i.stage == first));
        }
    }

    #[test]
    fn stage_for_edges() {
        assert_eq!(stage_for(0, 1), 1);
        assert_eq!(stage_for(0, 0), 1);
        assert_eq!(stage_for(0, 2), 1);
        assert_eq!(stage_for(1, 2), 4);
        assert_eq!(stage_for(1, 3), 3);
        assert_eq!(stage_for(5, 6), 4);
    }

    #[test]
    fn deps_point_at_next_category() {
        let model = generate_model("", DEFAULT_TITLE, false);
        let cats = &model.categories;

        for pair in cats.windows(2) {
            let expected = pair[1].leading_ids(2);
            assert!(pair[0].items.iter().all(|i| i.deps == expected));
        }
        assert!(cats.last().unwrap().items.iter().all(|i| i.deps.is_empty()));
        assert_eq!(cats[0].items[0].deps, vec!["ui-portal", "api-access"]);
    }

    #[test]
    fn ids_are_valid_and_unique() {
        let text = "# Café\n# Café\n# Café\n- ü\n- ü\n- !!!\n";
        let model = generate_model(text, "Café", false);

        let mut category_ids = HashSet::new();
        for category in &model.categories {
            assert!(is_valid_slug(&category.id));
            assert!(category_ids.insert(category.id.clone()));
        }
        let mut item_ids = HashSet::new();
        for item in model.items() {
            assert!(is_valid_slug(&item.id));
            assert!(item_ids.insert(item.id.clone()));
        }
        assert_eq!(model.categories[1].id, "cafe-2");
    }

    #[test]
    fn generation_is_deterministic() {
        let text = "# Plan\n\nA reasonably long opening paragraph describing the plan in detail.\n\n## A\n- x1\n## B\n## C\n";
        let first = generate_model(text, "Plan", true).to_canonical_json();
        let second = generate_model(text, "Plan", true).to_canonical_json();
        assert_eq!(first, second);
    }

    #[test]
    fn series_renames_models() {
        let [current, target] = generate_series("", DEFAULT_TITLE, false);

        assert_eq!(current.id, "blockscape-map-current");
        assert_eq!(target.id, "blockscape-map-target");
        assert_eq!(current.title, "Blockscape Map Blockscape (Current)");
        assert_eq!(target.title, "Blockscape Map Blockscape (Target)");
        assert_eq!(current.abstract_text, fallback_abstract(DEFAULT_TITLE));
        assert!(target.abstract_text.ends_with(TARGET_ABSTRACT_CLAUSE));
        assert!(!target.abstract_text.contains(".."));
        assert_eq!(current.categories, target.categories);
    }

    #[test]
    fn generate_uses_request_flags() {
        let request = MapRequest::new("no headings").with_file_path("docs/road_map.md");
        match generate(&request) {
            MapOutput::Single(model) => assert_eq!(model.title, "Road Map Blockscape"),
            other => panic!("expected single model, got {:?}", other),
        }

        let output = generate(&MapRequest::new("").series(true).stage_model(true));
        assert_eq!(output.models().len(), 2);
        assert!(output.models()[0].items().all(|i| i.stage.is_some()));
    }
}

use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::model::{Exercise, ExerciseAssignment};

/// Muscle-group category used to narrow exercise lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    UpperBody,
    LowerBody,
    Core,
    Cardio,
}

pub const ALL_CATEGORIES: [Category; 4] = [
    Category::UpperBody,
    Category::LowerBody,
    Category::Core,
    Category::Cardio,
];

/// Lower-cased muscle-group keywords and the category each one belongs to.
/// A muscle group falls in a category when it contains one of its keywords.
pub static MUSCLE_KEYWORDS: phf::Map<&'static str, Category> = phf_map! {
    "pecho" => Category::UpperBody,
    "hombro" => Category::UpperBody,
    "brazo" => Category::UpperBody,
    "espalda" => Category::UpperBody,
    "bíceps" => Category::UpperBody,
    "biceps" => Category::UpperBody,
    "tríceps" => Category::UpperBody,
    "triceps" => Category::UpperBody,
    "dorsal" => Category::UpperBody,
    "pierna" => Category::LowerBody,
    "gluteo" => Category::LowerBody,
    "glúteo" => Category::LowerBody,
    "cuádriceps" => Category::LowerBody,
    "cuadriceps" => Category::LowerBody,
    "isquio" => Category::LowerBody,
    "gemelo" => Category::LowerBody,
    "femoral" => Category::LowerBody,
    "abdomen" => Category::Core,
    "abdominal" => Category::Core,
    "core" => Category::Core,
    "oblicuo" => Category::Core,
    "lumbar" => Category::Core,
    "cardio" => Category::Cardio,
};

impl Category {
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        MUSCLE_KEYWORDS
            .entries()
            .filter(move |(_, c)| **c == self)
            .map(|(k, _)| *k)
    }

    /// Whether any lower-cased muscle group contains one of the keywords.
    pub fn matches<S: AsRef<str>>(self, muscle_groups: &[S]) -> bool {
        muscle_groups
            .iter()
            .any(|g| categories_of(g.as_ref()).contains(&self))
    }
}

/// Categories a single muscle group falls in, in `ALL_CATEGORIES` order.
pub fn categories_of(muscle_group: &str) -> Vec<Category> {
    let group = muscle_group.to_lowercase();
    ALL_CATEGORIES
        .into_iter()
        .filter(|c| c.keywords().any(|k| group.contains(k)))
        .collect()
}

/// Which categories are switched on. With none active, every item passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFlags {
    pub upper_body: bool,
    pub lower_body: bool,
    pub core: bool,
    pub cardio: bool,
}

impl CategoryFlags {
    pub fn set(&mut self, category: Category, on: bool) {
        match category {
            Category::UpperBody => self.upper_body = on,
            Category::LowerBody => self.lower_body = on,
            Category::Core => self.core = on,
            Category::Cardio => self.cardio = on,
        }
    }

    pub fn is_active(&self, category: Category) -> bool {
        match category {
            Category::UpperBody => self.upper_body,
            Category::LowerBody => self.lower_body,
            Category::Core => self.core,
            Category::Cardio => self.cardio,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = Category> + '_ {
        ALL_CATEGORIES.into_iter().filter(|c| self.is_active(*c))
    }

    pub fn any(&self) -> bool {
        self.active().next().is_some()
    }
}

/// Anything the filter can inspect.
pub trait Filterable {
    fn name(&self) -> &str;
    fn muscle_groups(&self) -> &[String];
}

impl Filterable for Exercise {
    fn name(&self) -> &str {
        &self.name
    }

    fn muscle_groups(&self) -> &[String] {
        &self.muscle_groups
    }
}

impl Filterable for ExerciseAssignment {
    fn name(&self) -> &str {
        &self.exercise.name
    }

    fn muscle_groups(&self) -> &[String] {
        &self.exercise.muscle_groups
    }
}

/// Check a single item against the search term and category flags.
pub fn matches<T: Filterable + ?Sized>(item: &T, search_term: &str, flags: &CategoryFlags) -> bool {
    let term = search_term.trim().to_lowercase();
    if !term.is_empty() {
        let in_name = item.name().to_lowercase().contains(&term);
        let in_groups = item
            .muscle_groups()
            .iter()
            .any(|g| g.to_lowercase().contains(&term));
        if !in_name && !in_groups {
            return false;
        }
    }
    if flags.any() && !flags.active().any(|c| c.matches(item.muscle_groups())) {
        return false;
    }
    true
}

/// Return the items passing both the search term and the category flags,
/// in their original order.
pub fn filter_exercises<'a, T: Filterable>(
    items: &'a [T],
    search_term: &str,
    flags: &CategoryFlags,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| matches(*item, search_term, flags))
        .collect()
}

//! The fixed list of exercises the entry form offers, per category and
//! sub-category. Free-text exercise names are still accepted anywhere
//! a name is expected; the catalog only drives suggestions.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::workout::Category;

#[derive(Debug, Serialize)]
pub struct Group {
    pub key: &'static str,
    pub name: &'static str,
    pub exercises: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub name: &'static str,
    pub description: &'static str,
    pub groups: &'static [Group],
}

static STRENGTH: CategoryInfo = CategoryInfo {
    category: Category::Strength,
    name: "Strength (Resistance Training)",
    description: "Exercises focused on muscle growth and power. Tracked by Sets and Reps.",
    groups: &[
        Group {
            key: "push",
            name: "Push",
            exercises: &[
                "Bench Press",
                "Overhead Press",
                "Push-ups",
                "Tricep Dips",
                "Shoulder Press",
                "Chest Fly",
                "Dips",
            ],
        },
        Group {
            key: "pull",
            name: "Pull",
            exercises: &[
                "Pull-ups",
                "Lat Pulldowns",
                "Bicep Curls",
                "Rows",
                "Deadlifts",
                "Chin-ups",
                "Face Pulls",
            ],
        },
        Group {
            key: "legs",
            name: "Legs",
            exercises: &[
                "Squats",
                "Deadlifts",
                "Lunges",
                "Leg Press",
                "Calf Raises",
                "Leg Curls",
                "Leg Extensions",
            ],
        },
        Group {
            key: "core",
            name: "Core",
            exercises: &[
                "Planks",
                "Crunches",
                "Leg Raises",
                "Russian Twists",
                "Mountain Climbers",
                "Dead Bug",
                "Bird-Dog",
            ],
        },
    ],
};

static CARDIO: CategoryInfo = CategoryInfo {
    category: Category::Cardio,
    name: "Cardio (Aerobic/Anaerobic)",
    description: "Focused on heart health and endurance. Tracked by Time and Distance/Intensity.",
    groups: &[
        Group {
            key: "steady",
            name: "Steady State",
            exercises: &[
                "Running",
                "Cycling",
                "Swimming",
                "Rowing",
                "Walking",
                "Elliptical",
                "Stair Master",
            ],
        },
        Group {
            key: "high",
            name: "High Intensity",
            exercises: &[
                "Sprints",
                "Burpees",
                "Jump Rope",
                "HIIT",
                "Box Jumps",
                "Battle Ropes",
                "Kettlebell Swings",
            ],
        },
        Group {
            key: "inclined",
            name: "Inclined",
            exercises: &[
                "Stair Climber",
                "Hill Sprints",
                "Incline Treadmill",
                "Hiking",
                "Stair Running",
            ],
        },
    ],
};

static FLEXIBILITY: CategoryInfo = CategoryInfo {
    category: Category::Flexibility,
    name: "Flexibility & Recovery",
    description: "Focus on range of motion and injury prevention. Tracked by Duration.",
    groups: &[
        Group {
            key: "static",
            name: "Static Stretching",
            exercises: &[
                "Hamstring Stretch",
                "Chest Opener",
                "Quad Stretch",
                "Butterfly Stretch",
                "Neck Stretch",
                "Shoulder Stretch",
            ],
        },
        Group {
            key: "dynamic",
            name: "Dynamic",
            exercises: &[
                "Arm Circles",
                "Leg Swings",
                "Cat-Cow",
                "Torso Twists",
                "Hip Circles",
                "Ankle Rolls",
            ],
        },
        Group {
            key: "yoga",
            name: "Yoga/Pilates",
            exercises: &[
                "Downward Dog",
                "Sun Salutation",
                "Bird-Dog",
                "Child's Pose",
                "Warrior Pose",
                "Tree Pose",
                "Cobra Stretch",
            ],
        },
    ],
};

lazy_static! {
    static ref FLATTENED: HashMap<Category, Vec<&'static str>> = Category::ALL
        .iter()
        .map(|&c| (c, flatten(category(c))))
        .collect();
}

fn flatten(info: &'static CategoryInfo) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();

    for group in info.groups {
        for &exercise in group.exercises {
            if !names.contains(&exercise) {
                names.push(exercise);
            }
        }
    }

    names
}

pub fn category(category: Category) -> &'static CategoryInfo {
    match category {
        Category::Strength => &STRENGTH,
        Category::Cardio => &CARDIO,
        Category::Flexibility => &FLEXIBILITY,
    }
}

pub fn all() -> [&'static CategoryInfo; 3] {
    [&STRENGTH, &CARDIO, &FLEXIBILITY]
}

/// Every exercise in the category, in declaration order, each once.
pub fn exercises(category: Category) -> &'static [&'static str] {
    FLATTENED
        .get(&category)
        .map(|names| names.as_slice())
        .unwrap_or(&[])
}

/// Case-insensitive membership test.
pub fn contains(category: Category, name: &str) -> bool {
    let name = name.trim().to_lowercase();

    exercises(category)
        .iter()
        .any(|exercise| exercise.to_lowercase() == name)
}

/// A note for names outside the catalog, listing a few known ones.
/// `None` when `name` is already listed.
pub fn hint(category: Category, name: &str) -> Option<String> {
    if contains(category, name) {
        return None;
    }

    let known: Vec<&str> = exercises(category).iter().take(5).copied().collect();

    Some(format!(
        "{:?} is not in the {} catalog; known names include {}",
        name.trim(),
        category,
        known.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_exercises_are_listed_once() {
        let strength = exercises(Category::Strength);

        assert_eq!(strength.iter().filter(|&&e| e == "Deadlifts").count(), 1);
        assert_eq!(strength.len(), 27);
        assert_eq!(strength[0], "Bench Press");
        assert_eq!(strength[strength.len() - 1], "Bird-Dog");
    }

    #[test]
    fn categories_keep_their_groups() {
        let names: Vec<_> = category(Category::Cardio)
            .groups
            .iter()
            .map(|g| g.name)
            .collect();

        assert_eq!(names, ["Steady State", "High Intensity", "Inclined"]);
        assert_eq!(exercises(Category::Cardio).len(), 19);
        assert_eq!(exercises(Category::Flexibility).len(), 19);
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert!(contains(Category::Flexibility, " downward dog"));
        assert!(contains(Category::Strength, "BIRD-DOG"));
        assert!(!contains(Category::Cardio, "Bench Press"));
    }

    #[test]
    fn all_categories_are_present() {
        let categories: Vec<_> = all().iter().map(|info| info.category).collect();

        assert_eq!(categories, Category::ALL);
    }

    #[test]
    fn hints_only_for_unknown_names() {
        assert_eq!(hint(Category::Strength, " bench press "), None);

        let note = hint(Category::Strength, "Zercher Carry").expect("unknown name");
        assert!(note.starts_with("\"Zercher Carry\" is not in the strength catalog"));
        assert!(note.ends_with(
            "known names include Bench Press, Overhead Press, Push-ups, Tricep Dips, Shoulder Press"
        ));
    }
}

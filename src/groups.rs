//! Catalogue of student groups by course.

/// One course and its groups, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Course {
    pub name: &'static str,
    pub groups: &'static [&'static str],
}

/// All courses served by the bot.
pub const COURSES: &[Course] = &[
    Course {
        name: "1 курс",
        groups: &[
            "1а1", "1бд1", "1бд3", "1бп1", "1бу1", "1бу3", "1вб1", "1вб2", "1вб3(б)", "1д1", "1д3",
            "1ис1", "1ис2", "1ис3", "1м1", "1пк1", "1пк2", "1р1", "1р3", "1са1", "1са2", "1са3",
        ],
    },
    Course {
        name: "2 курс",
        groups: &[
            "2а1", "2бд1", "2бд3", "2бп3", "2бу1", "2бу3", "2вб1", "2вб2", "2вб3", "2д1", "2д3",
            "2ис1", "2ис3", "2м1", "2пк1", "2пк2", "2р1", "2р3", "2са1", "2са3",
        ],
    },
    Course {
        name: "3 курс",
        groups: &[
            "3а1", "3бд1", "3бд3", "3бу1", "3бу3", "3вб1", "3вб2", "3вб3", "3д1", "3д3", "3ис1",
            "3ис3", "3м1", "3пк1", "3пк2", "3р1", "3р3", "3са1", "3са3",
        ],
    },
    Course {
        name: "4 курс",
        groups: &[
            "4бу1", "4вб1", "4вб2", "4вб3", "4д1", "4ис1", "4ис3", "4м1", "4пк1", "4пк2", "4р1",
            "4р3",
        ],
    },
];

/// Every group of every course, in catalogue order.
pub fn all_groups() -> impl Iterator<Item = &'static str> {
    COURSES.iter().flat_map(|c| c.groups.iter().copied())
}

/// The course `group` belongs to.
pub fn course_of(group: &str) -> Option<&'static Course> {
    COURSES.iter().find(|c| c.groups.contains(&group))
}

pub fn is_known_group(group: &str) -> bool {
    course_of(group).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_sizes() {
        let sizes: Vec<usize> = COURSES.iter().map(|c| c.groups.len()).collect();
        assert_eq!(sizes, vec![22, 20, 19, 12]);
        assert_eq!(all_groups().count(), 73);
    }

    #[test]
    fn group_names_are_unique() {
        let unique: HashSet<&str> = all_groups().collect();
        assert_eq!(unique.len(), all_groups().count());
    }

    #[test]
    fn groups_start_with_course_number() {
        for (i, course) in COURSES.iter().enumerate() {
            let prefix = char::from_digit(i as u32 + 1, 10).expect("digit");
            assert!(course.groups.iter().all(|g| g.starts_with(prefix)));
        }
    }

    #[test]
    fn course_lookup() {
        assert_eq!(course_of("2ис1").map(|c| c.name), Some("2 курс"));
        assert_eq!(course_of("1вб3(б)").map(|c| c.name), Some("1 курс"));
        assert!(course_of("9zz9").is_none());
        assert!(is_known_group("4р3"));
        assert!(!is_known_group(""));
    }
}

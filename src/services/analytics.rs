//! Aggregate statistics over a snapshot of blogs.
//!
//! Every function is pure: it reads the slice in order, never mutates it and
//! never fails. An empty input produces `None` (or `0` for [`total_likes`]).
//! When several candidates share the maximum, the one that appears first in
//! the input wins, so results are reproducible for a given order.
//!
//! Like counts are summed as `i128`. Each stored count fits in `i64`, so a
//! sum over any realistic number of blogs is exact.

use serde::Serialize;

use crate::domain::Blog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteBlog {
    pub title: String,
    pub author: Option<String>,
    pub likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBlogs {
    pub author: Option<String>,
    pub blogs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    pub author: Option<String>,
    pub likes: i128,
}

/// All aggregates computed over the same snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogStats {
    pub total_likes: i128,
    #[serde(serialize_with = "empty_object_if_none")]
    pub favorite_blog: Option<FavoriteBlog>,
    #[serde(serialize_with = "empty_object_if_none")]
    pub most_blogs: Option<AuthorBlogs>,
    #[serde(serialize_with = "empty_object_if_none")]
    pub most_likes: Option<AuthorLikes>,
}

#[must_use]
pub fn total_likes(blogs: &[Blog]) -> i128 {
    blogs.iter().map(|blog| i128::from(blog.likes)).sum()
}

#[must_use]
pub fn favorite_blog(blogs: &[Blog]) -> Option<FavoriteBlog> {
    let mut best: Option<&Blog> = None;
    for blog in blogs {
        // strict comparison keeps the earliest of equal maxima
        if best.is_none_or(|current| blog.likes > current.likes) {
            best = Some(blog);
        }
    }

    best.map(|blog| FavoriteBlog {
        title: blog.title.clone(),
        author: blog.author.clone(),
        likes: blog.likes,
    })
}

#[must_use]
pub fn most_blogs(blogs: &[Blog]) -> Option<AuthorBlogs> {
    max_by_author(blogs, |_| 1).map(|(author, count)| AuthorBlogs {
        author,
        blogs: usize::try_from(count).unwrap_or(usize::MAX),
    })
}

#[must_use]
pub fn most_likes(blogs: &[Blog]) -> Option<AuthorLikes> {
    max_by_author(blogs, |blog| i128::from(blog.likes))
        .map(|(author, likes)| AuthorLikes { author, likes })
}

#[must_use]
pub fn summarize(blogs: &[Blog]) -> BlogStats {
    BlogStats {
        total_likes: total_likes(blogs),
        favorite_blog: favorite_blog(blogs),
        most_blogs: most_blogs(blogs),
        most_likes: most_likes(blogs),
    }
}

/// Groups by author in order of first appearance and returns the author with
/// the largest summed weight. O(n·k) for k distinct authors.
fn max_by_author<F>(blogs: &[Blog], weight: F) -> Option<(Option<String>, i128)>
where
    F: Fn(&Blog) -> i128,
{
    let mut totals: Vec<(Option<&str>, i128)> = Vec::new();

    for blog in blogs {
        let author = blog.author.as_deref();
        match totals.iter_mut().find(|(seen, _)| *seen == author) {
            Some((_, total)) => *total += weight(blog),
            None => totals.push((author, weight(blog))),
        }
    }

    let mut best: Option<(Option<&str>, i128)> = None;
    for (author, total) in totals {
        if best.is_none_or(|(_, current)| total > current) {
            best = Some((author, total));
        }
    }

    best.map(|(author, total)| (author.map(str::to_string), total))
}

fn empty_object_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlogId, UserId};

    fn blog(title: &str, author: Option<&str>, likes: i64) -> Blog {
        Blog {
            id: BlogId::generate(),
            title: title.to_string(),
            author: author.map(str::to_string),
            url: format!("https://example.com/{title}"),
            likes,
            user_id: UserId::generate(),
            created_at: String::new(),
        }
    }

    fn sample_blogs() -> Vec<Blog> {
        vec![
            blog("React patterns", Some("Michael Chan"), 7),
            blog("Go To Statement Considered Harmful", Some("Edsger W. Dijkstra"), 5),
            blog("Canonical string reduction", Some("Edsger W. Dijkstra"), 12),
            blog("First class tests", Some("Robert C. Martin"), 10),
            blog("TDD harms architecture", Some("Robert C. Martin"), 0),
            blog("Type wars", Some("Robert C. Martin"), 2),
        ]
    }

    #[test]
    fn test_total_likes_of_empty_list_is_zero() {
        assert_eq!(total_likes(&[]), 0);
    }

    #[test]
    fn test_total_likes_of_single_blog() {
        assert_eq!(total_likes(&[blog("Only", None, 5)]), 5);
    }

    #[test]
    fn test_total_likes_of_bigger_list() {
        assert_eq!(total_likes(&sample_blogs()), 36);
    }

    #[test]
    fn test_likes_near_i64_max_do_not_overflow() {
        let blogs = vec![
            blog("huge", Some("X"), i64::MAX),
            blog("one", Some("X"), 1),
            blog("other", Some("Y"), i64::MAX),
        ];

        let expected = 2 * i128::from(i64::MAX) + 1;
        assert_eq!(total_likes(&blogs), expected);

        let top = most_likes(&blogs).unwrap();
        assert_eq!(top.author.as_deref(), Some("X"));
        assert_eq!(top.likes, i128::from(i64::MAX) + 1);
    }

    #[test]
    fn test_favorite_blog_picks_maximum() {
        let blogs = vec![blog("a", None, 5), blog("b", None, 12), blog("c", None, 3)];
        let favorite = favorite_blog(&blogs).unwrap();
        assert_eq!(favorite.title, "b");
        assert_eq!(favorite.likes, 12);
    }

    #[test]
    fn test_favorite_blog_tie_goes_to_first() {
        let blogs = vec![blog("a", None, 1), blog("b", None, 9), blog("c", None, 9)];
        assert_eq!(favorite_blog(&blogs).unwrap().title, "b");
    }

    #[test]
    fn test_favorite_blog_of_empty_list() {
        assert_eq!(favorite_blog(&[]), None);
    }

    #[test]
    fn test_most_blogs() {
        assert_eq!(
            most_blogs(&sample_blogs()),
            Some(AuthorBlogs {
                author: Some("Robert C. Martin".to_string()),
                blogs: 3,
            })
        );
        assert_eq!(most_blogs(&[]), None);
    }

    #[test]
    fn test_most_blogs_tie_goes_to_first_appearing_author() {
        let blogs = vec![
            blog("1", Some("B"), 0),
            blog("2", Some("A"), 0),
            blog("3", Some("A"), 0),
            blog("4", Some("B"), 0),
        ];
        assert_eq!(most_blogs(&blogs).unwrap().author.as_deref(), Some("B"));
    }

    #[test]
    fn test_most_likes() {
        assert_eq!(
            most_likes(&sample_blogs()),
            Some(AuthorLikes {
                author: Some("Edsger W. Dijkstra".to_string()),
                likes: 17,
            })
        );
        assert_eq!(most_likes(&[]), None);
    }

    #[test]
    fn test_most_likes_tie_goes_to_first_appearing_author() {
        let blogs = vec![
            blog("1", Some("A"), 4),
            blog("2", Some("B"), 10),
            blog("3", Some("A"), 6),
        ];
        assert_eq!(most_likes(&blogs).unwrap().author.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_author_forms_its_own_group() {
        let blogs = vec![blog("1", None, 1), blog("2", None, 1), blog("3", Some("A"), 1)];
        let top = most_blogs(&blogs).unwrap();
        assert_eq!(top.author, None);
        assert_eq!(top.blogs, 2);
    }

    #[test]
    fn test_input_is_left_untouched() {
        let blogs = sample_blogs();
        let before = blogs.clone();
        let _ = summarize(&blogs);
        assert_eq!(blogs, before);
    }

    #[test]
    fn test_empty_stats_serialize_as_empty_objects() {
        let json = serde_json::to_value(summarize(&[])).unwrap();
        assert_eq!(json["total_likes"], 0);
        assert_eq!(json["favorite_blog"], serde_json::json!({}));
        assert_eq!(json["most_blogs"], serde_json::json!({}));
        assert_eq!(json["most_likes"], serde_json::json!({}));
    }
}

//! Summary statistics over an already-loaded list of blogs.
//!
//! Every function is total: an empty list yields `0` or [`Aggregate::Empty`].
//! Ties go to whichever candidate appears first in the input order.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use super::repo_types::Blog;

pub const EMPTY_LIST_MESSAGE: &str = "List is empty";

/// Result of an aggregation that needs at least one blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate<T> {
    Empty,
    Value(T),
}

impl<T> Aggregate<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Aggregate::Empty => None,
            Aggregate::Value(v) => Some(v),
        }
    }
}

impl<T: Serialize> Serialize for Aggregate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Aggregate::Empty => serializer.serialize_str(EMPTY_LIST_MESSAGE),
            Aggregate::Value(v) => v.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteBlog {
    pub title: String,
    pub author: Option<String>,
    pub likes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBlogs {
    pub author: Option<String>,
    #[serde(rename = "blogs")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    pub author: Option<String>,
    pub likes: i64,
}

pub fn total_likes(blogs: &[Blog]) -> i64 {
    blogs.iter().map(|b| b.likes).sum()
}

pub fn favorite_blog(blogs: &[Blog]) -> Aggregate<FavoriteBlog> {
    let mut iter = blogs.iter();
    let Some(first) = iter.next() else {
        return Aggregate::Empty;
    };
    // strict `>` keeps the earliest maximum
    let best = iter.fold(first, |best, b| if b.likes > best.likes { b } else { best });
    Aggregate::Value(FavoriteBlog {
        title: best.title.clone(),
        author: best.author.clone(),
        likes: best.likes,
    })
}

pub fn most_blogs(blogs: &[Blog]) -> Aggregate<AuthorBlogs> {
    match max_group(group_by_author(blogs, |_| 1usize)) {
        Some((author, count)) => Aggregate::Value(AuthorBlogs { author, count }),
        None => Aggregate::Empty,
    }
}

pub fn most_likes(blogs: &[Blog]) -> Aggregate<AuthorLikes> {
    match max_group(group_by_author(blogs, |b| b.likes)) {
        Some((author, likes)) => Aggregate::Value(AuthorLikes { author, likes }),
        None => Aggregate::Empty,
    }
}

/// Missing and empty authors share the `None` group.
fn author_key(blog: &Blog) -> Option<&str> {
    blog.author.as_deref().filter(|a| !a.is_empty())
}

/// Sums `weight` per author, keeping groups in order of first appearance.
fn group_by_author<'a, W, F>(blogs: &'a [Blog], weight: F) -> Vec<(Option<&'a str>, W)>
where
    W: std::ops::AddAssign + Copy,
    F: Fn(&Blog) -> W,
{
    let mut index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, W)> = Vec::new();
    for blog in blogs {
        let key = author_key(blog);
        match index.get(&key) {
            Some(&i) => groups[i].1 += weight(blog),
            None => {
                index.insert(key, groups.len());
                groups.push((key, weight(blog)));
            }
        }
    }
    groups
}

fn max_group<W: PartialOrd + Copy>(groups: Vec<(Option<&str>, W)>) -> Option<(Option<String>, W)> {
    let mut iter = groups.into_iter();
    let first = iter.next()?;
    let (author, total) = iter.fold(first, |best, g| if g.1 > best.1 { g } else { best });
    Some((author.map(str::to_string), total))
}

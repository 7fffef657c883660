//! Ordered fallback chains.
//!
//! Title extraction, author extraction and the merge policy all boil down to
//! "take the first value that is actually there". [`Presence`] defines what
//! "there" means per type, and [`first_present`] / [`prefer`] apply it.

/// A value that may be semantically empty even when it exists.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for &str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for f64 {
    fn is_present(&self) -> bool {
        !self.is_nan()
    }
}

impl Presence for u32 {
    fn is_present(&self) -> bool {
        true
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        match self {
            Some(v) => v.is_present(),
            None => false,
        }
    }
}

/// First present value of an ordered chain, if any.
pub fn first_present<T, I>(chain: I) -> Option<T>
where
    T: Presence,
    I: IntoIterator<Item = T>,
{
    chain.into_iter().find(Presence::is_present)
}

/// `primary` when present, otherwise `fallback`.
pub fn prefer<T: Presence>(primary: T, fallback: T) -> T {
    if primary.is_present() {
        primary
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_skips_blank_strings() {
        let chain = [None, Some(""), Some("  "), Some("Berserk"), Some("Naruto")];
        assert_eq!(first_present(chain.into_iter().flatten()), Some("Berserk"));
    }

    #[test]
    fn test_first_present_empty_chain() {
        let chain: Vec<Option<&str>> = vec![None, Some("")];
        assert_eq!(first_present(chain.into_iter().flatten()), None);
    }

    #[test]
    fn test_prefer_vectors() {
        assert_eq!(prefer(vec![1], vec![2, 3]), vec![1]);
        assert_eq!(prefer(Vec::<i32>::new(), vec![2, 3]), vec![2, 3]);
    }

    #[test]
    fn test_prefer_options() {
        assert_eq!(prefer(Some(7.5), None), Some(7.5));
        assert_eq!(prefer(None, Some(3u32)), Some(3));
        assert_eq!(
            prefer(Some(String::new()), Some("kept".to_string())),
            Some("kept".to_string())
        );
    }
}

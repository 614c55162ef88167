//! Most frequent elements of a sequence, counted with a `ChainedMap`

use crate::ChainedMap;

/// Returns the most frequent elements of `items` and how often they occur.
///
/// Modes are listed in the order their count first reached the final
/// maximum, not sorted. An empty input yields no modes and a frequency of 0.
///
/// ```rust
/// use primemap::find_mode;
///
/// let (modes, frequency) = find_mode(["apple", "apple", "grape", "melon", "peach"]);
/// assert_eq!(modes, vec!["apple"]);
/// assert_eq!(frequency, 2);
/// ```
pub fn find_mode<I, T>(items: I) -> (Vec<T>, usize)
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut counts: ChainedMap<usize> = ChainedMap::default();
    let mut modes = Vec::new();
    let mut max_frequency = 0;

    for item in items {
        let count = counts.get(item.as_ref()).map_or(1, |count| count.saturating_add(1));
        counts.put(item.as_ref(), count);

        if count > max_frequency {
            max_frequency = count;
            modes.clear();
            modes.push(item);
        } else if count == max_frequency {
            modes.push(item);
        }
    }

    (modes, max_frequency)
}

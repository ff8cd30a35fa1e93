/// Returns true iff every element equals every other element.
///
/// The empty collection is uniform. Absent values are modelled as `Option::None`, so a
/// collection holding `None` is uniform only when every element is `None`.
pub fn is_uniform<I>(items: I) -> bool
where
    I: IntoIterator,
    I::Item: PartialEq,
{
    let mut iter = items.into_iter();
    match iter.next() {
        None => true,
        Some(first) => iter.all(|item| item == first),
    }
}

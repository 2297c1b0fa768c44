/// Selects the median of a set of samples.
///
/// Calibration readings are occasionally disturbed by interrupts or scheduling, which show up as a
/// long tail of large values.  The median ignores that tail entirely, where a mean would be pulled
/// towards it.
///
/// Samples are sorted in place.  With an odd number of samples the median is the middle element;
/// with an even number it is the upper of the two middle elements.
///
/// Returns `None` if there are no samples.
#[inline]
pub(crate) fn median<T: Copy + PartialOrd>(samples: &mut [T]) -> Option<T> {
    if samples.is_empty() {
        return None;
    }

    // NaN samples compare as equal to everything.
    samples.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(samples[samples.len() / 2])
}

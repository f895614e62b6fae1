use log::debug;

/// Concatenates a sample's consensus fragments in fragment-ID order.
///
/// Keys are fixed-width zero-padded numbers, so sorting them as strings puts
/// them in numeric order. Assembly stops before the first fragment whose ID
/// jumps more than one past the previous ID; a key that is not a number ends
/// the run the same way.
///
/// # Arguments
///
/// * `sample_id` - Sample being assembled, for logging.
/// * `fragments` - `(fragment_id, consensus)` pairs in any order.
///
/// # Returns
/// The payload DNA, empty when nothing assembles.
pub fn assemble(sample_id: &str, fragments: &[(&str, &str)]) -> String {
    let mut ordered = fragments.to_vec();
    ordered.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut payload = String::new();
    let mut previous_id: u64 = 0;
    for (fragment_id, consensus) in ordered {
        let current_id = match fragment_id.parse::<u64>() {
            Ok(id) => id,
            Err(_) => {
                debug!("Sample {}: non-numeric fragment id {:?} ends assembly", sample_id, fragment_id);
                break;
            }
        };
        if current_id > previous_id.saturating_add(1) {
            debug!(
                "Sample {}: gap after fragment {}; dropping fragment {} and later",
                sample_id, previous_id, fragment_id
            );
            break;
        }
        payload.push_str(consensus);
        previous_id = current_id;
    }
    payload
}

use uuid::Uuid;

/// Time-ordered ids so that lexicographic order on the `id` column follows
/// insertion order, even for rows created within the same millisecond.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

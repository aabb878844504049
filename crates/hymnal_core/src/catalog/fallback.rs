//! Built-in sample catalog used when the real catalog cannot be loaded.

use crate::model::item::Item;

/// Returns the sample catalog in display order.
pub fn sample_catalog() -> Vec<Item> {
    vec![
        Item::new(1, "Amazing Grace")
            .with_body(
                "Amazing grace! How sweet the sound\nThat saved a wretch like me!\n\
                 I once was lost, but now am found;\nWas blind, but now I see.",
            )
            .with_audio("audio/001.mp3")
            .with_category("worshipful"),
        Item::new(2, "Holy, Holy, Holy")
            .with_body(
                "Holy, holy, holy! Lord God Almighty!\n\
                 Early in the morning our song shall rise to Thee.",
            )
            .with_audio("audio/002.mp3")
            .with_category("worshipful"),
        Item::new(3, "Be Still, My Soul")
            .with_body(
                "Be still, my soul: the Lord is on thy side.\n\
                 Bear patiently the cross of grief or pain.",
            )
            .with_audio("audio/003.mp3")
            .with_category("calm"),
        Item::new(4, "Joyful, Joyful, We Adore Thee")
            .with_body(
                "Joyful, joyful, we adore Thee,\nGod of glory, Lord of love;\n\
                 Hearts unfold like flowers before Thee.",
            )
            .with_audio("audio/004.mp3")
            .with_category("happy"),
        Item::new(5, "Abide with Me")
            .with_body("Abide with me; fast falls the eventide;\nThe darkness deepens; Lord with me abide.")
            .with_audio("audio/005.mp3")
            .with_category("reflective"),
    ]
}

#[cfg(test)]
mod tests {
    use super::sample_catalog;
    use std::collections::BTreeSet;

    #[test]
    fn sample_ids_are_unique_and_bodies_inline() {
        let items = sample_catalog();
        let ids = items.iter().map(|item| item.id).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), items.len());
        assert!(items.iter().all(|item| item.body.is_some()));
    }
}

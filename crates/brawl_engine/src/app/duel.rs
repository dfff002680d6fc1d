use super::scene::{CharacterId, SceneWorld};

/// Unordered pair of characters; `new(a, b) == new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DuelPair {
    first: CharacterId,
    second: CharacterId,
}

impl DuelPair {
    pub fn new(a: CharacterId, b: CharacterId) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> CharacterId {
        self.first
    }

    pub fn second(&self) -> CharacterId {
        self.second
    }

    pub fn involves(&self, id: CharacterId) -> bool {
        self.first == id || self.second == id
    }
}

/// Decides which characters may start a duel right now. Queried once per
/// tick after every role wrapper has moved.
pub trait DuelEligibility {
    fn possible_duels(&self, world: &SceneWorld) -> Vec<DuelPair>;
}

impl<F> DuelEligibility for F
where
    F: Fn(&SceneWorld) -> Vec<DuelPair>,
{
    fn possible_duels(&self, world: &SceneWorld) -> Vec<DuelPair> {
        self(world)
    }
}

/// Rule that never allows a duel.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuels;

impl DuelEligibility for NoDuels {
    fn possible_duels(&self, _world: &SceneWorld) -> Vec<DuelPair> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_order_is_irrelevant() {
        let a = CharacterId(4);
        let b = CharacterId(1);
        assert_eq!(DuelPair::new(a, b), DuelPair::new(b, a));
        assert_eq!(DuelPair::new(a, b).first(), b);
        assert!(DuelPair::new(a, b).involves(a));
        assert!(!DuelPair::new(a, b).involves(CharacterId(2)));
    }

    #[test]
    fn closures_act_as_rules() {
        let rule = |world: &SceneWorld| -> Vec<DuelPair> {
            let ids = world.characters().map(|c| c.id()).collect::<Vec<_>>();
            ids.windows(2).map(|w| DuelPair::new(w[0], w[1])).collect()
        };
        let world = SceneWorld::default();
        assert!(rule.possible_duels(&world).is_empty());
        assert!(NoDuels.possible_duels(&world).is_empty());
    }
}

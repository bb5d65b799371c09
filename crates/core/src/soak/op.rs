use rand::Rng;

/// Values are drawn from a small range so that `find` and `remove` hit
/// existing items often.
const VALUE_RANGE: u32 = 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Put(u32),
    PutAll(Vec<u32>),
    Get,
    GetMany(usize),
    GetInto(usize),
    Skip(usize),
    SetAt(usize, u32),
    Remove(u32),
    Find(u32),
    Clear,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Put(_) => "put",
            Op::PutAll(_) => "put_all",
            Op::Get => "get",
            Op::GetMany(_) => "get_many",
            Op::GetInto(_) => "get_into",
            Op::Skip(_) => "skip",
            Op::SetAt(..) => "set_at",
            Op::Remove(_) => "remove",
            Op::Find(_) => "find",
            Op::Clear => "clear",
        }
    }

    /// Picks an operation for a buffer currently holding `len` of `capacity`
    /// items. Sizes and indices deliberately overshoot by one so the error
    /// paths get exercised too.
    pub fn random<R: Rng>(rng: &mut R, len: usize, capacity: usize) -> Op {
        match rng.random_range(0..100u32) {
            0..=29 => Op::Put(value(rng)),
            30..=39 => {
                let n = rng.random_range(0..=capacity / 2 + 1);
                Op::PutAll((0..n).map(|_| value(rng)).collect())
            }
            40..=59 => Op::Get,
            60..=66 => Op::GetMany(rng.random_range(0..=capacity / 2 + 1)),
            67..=73 => Op::GetInto(rng.random_range(0..=capacity / 2 + 1)),
            74..=80 => Op::Skip(rng.random_range(0..=len + 1)),
            81..=87 => Op::SetAt(rng.random_range(0..=len), value(rng)),
            88..=93 => Op::Remove(value(rng)),
            94..=98 => Op::Find(value(rng)),
            _ => Op::Clear,
        }
    }
}

fn value<R: Rng>(rng: &mut R) -> u32 {
    rng.random_range(0..VALUE_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_ops_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..2_000 {
            match Op::random(&mut rng, 3, 4) {
                Op::PutAll(items) => assert!(items.len() <= 3),
                Op::GetMany(n) | Op::GetInto(n) => assert!(n <= 3),
                Op::Skip(n) => assert!(n <= 4),
                Op::SetAt(i, v) => assert!(i <= 3 && v < VALUE_RANGE),
                Op::Put(v) | Op::Remove(v) | Op::Find(v) => assert!(v < VALUE_RANGE),
                Op::Get | Op::Clear => {}
            }
        }
    }

    #[test]
    fn names_are_distinct() {
        let ops = [
            Op::Put(0),
            Op::PutAll(vec![]),
            Op::Get,
            Op::GetMany(0),
            Op::GetInto(0),
            Op::Skip(0),
            Op::SetAt(0, 0),
            Op::Remove(0),
            Op::Find(0),
            Op::Clear,
        ];
        let mut names: Vec<_> = ops.iter().map(Op::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ops.len());
    }
}

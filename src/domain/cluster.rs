// Viewer-side player records and distance-based grouping for map markers.

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub name: String,
    pub x: f64,
    pub y: Option<f64>,
    pub z: f64,
    // Epoch milliseconds of the latest sighting; never decreases.
    pub last_seen: u64,
}

/// Players drawn under one marker. The first member is the seed and anchors the marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub members: Vec<PlayerRecord>,
}

impl Cluster {
    pub fn seed(&self) -> &PlayerRecord {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Euclidean distance on the horizontal (x, z) plane.
pub fn planar_distance(a: &PlayerRecord, b: &PlayerRecord) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Single pass, seed-anchored grouping.
///
/// Players are visited in slice order. Each unassigned player seeds a cluster and absorbs every
/// other unassigned player within `radius` of the seed. Members are only compared
/// against the seed, never against each other, so the result depends on iteration order.
pub fn group_nearby_players(players: &[PlayerRecord], radius: f64) -> Vec<Cluster> {
    let mut assigned = vec![false; players.len()];
    let mut clusters = Vec::new();

    for (i, seed) in players.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut members = vec![seed.clone()];

        for (j, other) in players.iter().enumerate() {
            if assigned[j] {
                continue;
            }
            if planar_distance(seed, other) <= radius {
                members.push(other.clone());
                assigned[j] = true;
            }
        }

        clusters.push(Cluster { members });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    const RADIUS: f64 = 15.0;

    fn player(name: &str, x: f64, z: f64) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            x,
            y: None,
            z,
            last_seen: 0,
        }
    }

    #[test]
    fn players_within_radius_share_a_cluster() {
        let players = vec![player("Alice", 0.0, 0.0), player("Bob", 9.0, 12.0)];

        let clusters = group_nearby_players(&players, RADIUS);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].names(), vec!["Alice", "Bob"]);
        assert_eq!(clusters[0].seed().name, "Alice");
    }

    #[test]
    fn players_beyond_radius_stay_apart() {
        let players = vec![player("Alice", 0.0, 0.0), player("Bob", 15.1, 0.0)];

        let clusters = group_nearby_players(&players, RADIUS);

        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn members_only_need_to_be_near_the_seed() {
        // B and C are 28 apart but both within range of A.
        let players = vec![
            player("A", 0.0, 0.0),
            player("B", -14.0, 0.0),
            player("C", 14.0, 0.0),
        ];

        let clusters = group_nearby_players(&players, RADIUS);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].names(), vec!["A", "B", "C"]);
    }

    #[test]
    fn grouping_depends_on_iteration_order() {
        // Chain A - B - C with 10 units between neighbours.
        let a = player("A", 0.0, 0.0);
        let b = player("B", 10.0, 0.0);
        let c = player("C", 20.0, 0.0);

        let from_end = group_nearby_players(&[a.clone(), b.clone(), c.clone()], RADIUS);
        assert_eq!(from_end.len(), 2);
        assert_eq!(from_end[0].names(), vec!["A", "B"]);
        assert_eq!(from_end[1].names(), vec!["C"]);

        let from_middle = group_nearby_players(&[b, a, c], RADIUS);
        assert_eq!(from_middle.len(), 1);
        assert_eq!(from_middle[0].names(), vec!["B", "A", "C"]);
    }

    #[test]
    fn no_players_no_clusters() {
        assert!(group_nearby_players(&[], RADIUS).is_empty());
    }
}

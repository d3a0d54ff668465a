use std::collections::BTreeMap;

use freight_network::StationIdx;
use jiff::SignedDuration;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::{
    error::PlannerError,
    problem::{delivery_problem::DeliveryProblem, package::PackageIdx},
};

use super::{
    event::{MovementEvent, PackageList},
    vehicle_state::VehicleState,
};

enum Stop {
    Pickup {
        station: StationIdx,
        packages: PackageList,
    },
    Dropoff {
        station: StationIdx,
        packages: PackageList,
    },
}

struct PlannedRoute {
    stops: Vec<Stop>,
    travel_time: SignedDuration,
    final_station: StationIdx,
    skipped: Vec<PackageIdx>,
}

struct DropoffWalk {
    stops: Vec<Stop>,
    travel_time: SignedDuration,
    final_station: StationIdx,
    stranded: Vec<PackageIdx>,
}

/// Projection of a bundle route, without touching any vehicle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEstimate {
    pub travel_time: SignedDuration,
    pub final_station: StationIdx,
    pub unreachable: Vec<PackageIdx>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    pub delivered: Vec<PackageIdx>,
    pub undelivered: Vec<PackageIdx>,
}

/// Turns a bundle of packages into a concrete route.
///
/// Pickup stations are visited nearest first. Right after each pickup, the
/// packages loaded there are dropped off, again nearest destination first,
/// before moving on to the next pickup station.
pub struct RouteExecutor<'a> {
    problem: &'a DeliveryProblem,
}

impl<'a> RouteExecutor<'a> {
    pub fn new(problem: &'a DeliveryProblem) -> Self {
        RouteExecutor { problem }
    }

    pub fn estimate(&self, start: StationIdx, bundle: &[PackageIdx]) -> RouteEstimate {
        let route = self.plan_route(start, bundle);

        RouteEstimate {
            travel_time: route.travel_time,
            final_station: route.final_station,
            unreachable: route.skipped,
        }
    }

    /// Moves the vehicle through the route of `bundle`, logging one event per
    /// edge. Packages whose pickup or drop-off cannot be reached are returned
    /// as undelivered; the rest of the bundle is still carried out.
    pub fn execute(
        &self,
        state: &mut VehicleState,
        bundle: &[PackageIdx],
    ) -> Result<RouteOutcome, PlannerError> {
        let route = self.plan_route(state.station(), bundle);
        let start_time = state.time();
        let mut outcome = RouteOutcome {
            delivered: Vec::with_capacity(bundle.len()),
            undelivered: route.skipped,
        };

        let mut pending_pickups = PackageList::new();

        for stop in route.stops {
            match stop {
                Stop::Pickup { station, packages } => {
                    self.travel(state, station, &mut pending_pickups, &[])?;
                    state.load_packages(self.problem.bundle_weight(&packages));
                    pending_pickups.extend(packages);
                }
                Stop::Dropoff { station, packages } => {
                    self.travel(state, station, &mut pending_pickups, &packages)?;
                    state.unload_packages(self.problem.bundle_weight(&packages));
                    outcome.delivered.extend(packages);
                }
            }
        }

        debug_assert_eq!(route.final_station, state.station());
        debug_assert_eq!(route.travel_time, state.time() - start_time);

        Ok(outcome)
    }

    fn plan_route(&self, start: StationIdx, bundle: &[PackageIdx]) -> PlannedRoute {
        let mut pickups = self.group_by(bundle, |idx| self.problem.package(idx).origin());

        let mut route = PlannedRoute {
            stops: Vec::with_capacity(2 * pickups.len()),
            travel_time: SignedDuration::ZERO,
            final_station: start,
            skipped: Vec::new(),
        };

        let mut current = start;

        while !pickups.is_empty() {
            let Some((pickup, time)) = self.nearest(current, pickups.keys().copied()) else {
                warn!(
                    from = self.problem.station_name(current),
                    "Remaining pickup stations are unreachable"
                );
                route.skipped.extend(pickups.into_values().flatten());
                break;
            };

            let packages = pickups.remove(&pickup).unwrap_or_default();
            let (mut deliverable, stranded): (PackageList, PackageList) =
                packages.into_iter().partition(|&idx| {
                    self.problem
                        .is_reachable(pickup, self.problem.package(idx).destination())
                });

            route.skipped.extend(stranded);

            // With one-way edges a later drop-off may be unreachable from an earlier one
            let walk = loop {
                let walk = self.dropoff_walk(pickup, &deliverable);
                if walk.stranded.is_empty() {
                    break walk;
                }

                warn!(
                    from = self.problem.station_name(pickup),
                    packages = walk.stranded.len(),
                    "Remaining drop-off stations are unreachable"
                );
                deliverable.retain(|idx| !walk.stranded.contains(idx));
                route.skipped.extend(walk.stranded);
            };

            if deliverable.is_empty() {
                continue;
            }

            route.travel_time += time + walk.travel_time;
            current = walk.final_station;

            route.stops.push(Stop::Pickup {
                station: pickup,
                packages: deliverable,
            });
            route.stops.extend(walk.stops);
        }

        route.final_station = current;
        route
    }

    /// Nearest drop-off first from `pickup`. Stops at the first dead end and
    /// returns the packages it could not reach.
    fn dropoff_walk(&self, pickup: StationIdx, packages: &[PackageIdx]) -> DropoffWalk {
        let mut dropoffs = self.group_by(packages, |idx| self.problem.package(idx).destination());
        let mut walk = DropoffWalk {
            stops: Vec::with_capacity(dropoffs.len()),
            travel_time: SignedDuration::ZERO,
            final_station: pickup,
            stranded: Vec::new(),
        };

        while !dropoffs.is_empty() {
            let current = walk.final_station;
            let Some((dropoff, time)) = self.nearest(current, dropoffs.keys().copied()) else {
                walk.stranded.extend(dropoffs.into_values().flatten());
                break;
            };

            walk.travel_time += time;
            walk.final_station = dropoff;
            walk.stops.push(Stop::Dropoff {
                station: dropoff,
                packages: dropoffs.remove(&dropoff).unwrap_or_default(),
            });
        }

        walk
    }

    /// Groups packages by station, keeping bundle order inside each group.
    fn group_by(
        &self,
        bundle: &[PackageIdx],
        station_of: impl Fn(PackageIdx) -> StationIdx,
    ) -> BTreeMap<StationIdx, PackageList> {
        let mut groups: BTreeMap<StationIdx, PackageList> = BTreeMap::new();
        for &idx in bundle {
            groups.entry(station_of(idx)).or_default().push(idx);
        }
        groups
    }

    /// Closest reachable candidate from `from`; ties go to the lower station index.
    fn nearest(
        &self,
        from: StationIdx,
        candidates: impl Iterator<Item = StationIdx>,
    ) -> Option<(StationIdx, SignedDuration)> {
        candidates
            .filter_map(|station| {
                self.problem
                    .travel_time(from, station)
                    .map(|time| (station, time))
            })
            .min_by_key(|&(station, time)| (time, station))
    }

    /// Follows the shortest path from the vehicle's station to `to`.
    /// `pickups` are attached to the first edge and drained, `dropoffs` to the
    /// edge arriving at `to`.
    fn travel(
        &self,
        state: &mut VehicleState,
        to: StationIdx,
        pickups: &mut PackageList,
        dropoffs: &[PackageIdx],
    ) -> Result<(), PlannerError> {
        let from = state.station();

        if from == to {
            if !pickups.is_empty() || !dropoffs.is_empty() {
                let event = MovementEvent::new(
                    state.time(),
                    state.vehicle(),
                    from,
                    to,
                    std::mem::take(pickups),
                    SmallVec::from_slice(dropoffs),
                );
                state.traverse(event, SignedDuration::ZERO);
            }

            return Ok(());
        }

        let path = self
            .problem
            .shortest_path(from, to)
            .ok_or_else(|| self.corrupted_path(from, to))?;
        let last_leg = path.num_legs() - 1;

        for (index, (leg_from, leg_to)) in path.legs().enumerate() {
            let duration = self
                .problem
                .graph()
                .edge_duration(leg_from, leg_to)
                .ok_or_else(|| self.corrupted_path(leg_from, leg_to))?;

            let event = MovementEvent::new(
                state.time(),
                state.vehicle(),
                leg_from,
                leg_to,
                if index == 0 {
                    std::mem::take(pickups)
                } else {
                    PackageList::new()
                },
                if index == last_leg {
                    SmallVec::from_slice(dropoffs)
                } else {
                    PackageList::new()
                },
            );

            trace!(
                vehicle = %state.vehicle(),
                from = self.problem.station_name(leg_from),
                to = self.problem.station_name(leg_to),
                "Traverse edge"
            );

            state.traverse(event, duration);
        }

        Ok(())
    }

    fn corrupted_path(&self, from: StationIdx, to: StationIdx) -> PlannerError {
        PlannerError::CorruptedPath {
            from: self.problem.station_name(from).to_owned(),
            to: self.problem.station_name(to).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{
            delivery_problem::DeliveryProblemBuilder,
            package::Package,
            vehicle::{Vehicle, VehicleIdx},
        },
        test_utils::{self, package_ids, station},
    };

    #[test]
    fn test_single_package() {
        let problem = test_utils::create_test_problem(
            &["A", "B"],
            &[("A", "B", 10)],
            &[("P", 5, "A", "B")],
            &[("T", 10, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["P"]))
            .unwrap();

        assert_eq!(outcome.delivered, package_ids(&problem, &["P"]));
        assert!(outcome.undelivered.is_empty());

        assert_eq!(state.events().len(), 1);
        let event = &state.events()[0];
        assert_eq!(event.timestamp(), SignedDuration::ZERO);
        assert_eq!(event.from(), station(&problem, "A"));
        assert_eq!(event.to(), station(&problem, "B"));
        assert_eq!(event.pickups(), package_ids(&problem, &["P"]).as_slice());
        assert_eq!(event.dropoffs(), package_ids(&problem, &["P"]).as_slice());

        assert_eq!(state.time(), SignedDuration::from_mins(10));
        assert_eq!(state.station(), station(&problem, "B"));
        assert_eq!(state.load(), 0);
    }

    #[test]
    fn test_moves_to_pickup_first() {
        // T starts at C, package waits at A and goes to B
        let problem = test_utils::create_test_problem(
            &["A", "B", "C"],
            &[("A", "B", 10), ("C", "A", 4)],
            &[("P", 5, "A", "B")],
            &[("T", 10, "C")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        executor
            .execute(&mut state, &package_ids(&problem, &["P"]))
            .unwrap();

        let events = state.events();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].from(), station(&problem, "C"));
        assert_eq!(events[0].to(), station(&problem, "A"));
        assert!(events[0].pickups().is_empty());
        assert!(events[0].dropoffs().is_empty());

        assert_eq!(events[1].timestamp(), SignedDuration::from_mins(4));
        assert_eq!(events[1].pickups(), package_ids(&problem, &["P"]).as_slice());
        assert_eq!(events[1].dropoffs(), package_ids(&problem, &["P"]).as_slice());

        assert_eq!(state.time(), SignedDuration::from_mins(14));
    }

    #[test]
    fn test_multi_edge_path_attaches_names_to_ends() {
        let problem = test_utils::create_test_problem(
            &["A", "B", "C", "D"],
            &[("A", "B", 1), ("B", "C", 2), ("C", "D", 3)],
            &[("P", 1, "A", "D")],
            &[("T", 1, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        executor
            .execute(&mut state, &package_ids(&problem, &["P"]))
            .unwrap();

        let events = state.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.iter().map(|e| e.timestamp()).collect::<Vec<_>>(),
            vec![
                SignedDuration::ZERO,
                SignedDuration::from_mins(1),
                SignedDuration::from_mins(3)
            ]
        );
        assert!(!events[0].pickups().is_empty());
        assert!(events[0].dropoffs().is_empty());
        assert!(events[1].pickups().is_empty() && events[1].dropoffs().is_empty());
        assert!(events[2].pickups().is_empty());
        assert!(!events[2].dropoffs().is_empty());
        assert_eq!(state.time(), SignedDuration::from_mins(6));
    }

    #[test]
    fn test_nearest_pickup_order() {
        // Line A - B - C - D, vehicle at B. Pickup at C (1 min) is closer than A (5 min).
        let problem = test_utils::create_test_problem(
            &["A", "B", "C", "D"],
            &[("A", "B", 5), ("B", "C", 1), ("C", "D", 1)],
            &[("FAR", 1, "A", "B"), ("NEAR", 1, "C", "D")],
            &[("T", 5, "B")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["FAR", "NEAR"]))
            .unwrap();

        assert_eq!(outcome.delivered, package_ids(&problem, &["NEAR", "FAR"]));
        // B->C, C->D, D->C, C->B, B->A, A->B
        assert_eq!(state.events().len(), 6);
        assert_eq!(state.station(), station(&problem, "B"));
        assert_eq!(state.time(), SignedDuration::from_mins(1 + 1 + 1 + 1 + 5 + 5));
    }

    #[test]
    fn test_shared_pickup_visits_nearest_dropoff_first() {
        let problem = test_utils::create_test_problem(
            &["A", "B", "C"],
            &[("A", "B", 2), ("B", "C", 2)],
            &[("TO_C", 3, "A", "C"), ("TO_B", 4, "A", "B")],
            &[("T", 10, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["TO_C", "TO_B"]))
            .unwrap();

        assert_eq!(outcome.delivered, package_ids(&problem, &["TO_B", "TO_C"]));

        let events = state.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].pickups(),
            package_ids(&problem, &["TO_C", "TO_B"]).as_slice()
        );
        assert_eq!(events[0].dropoffs(), package_ids(&problem, &["TO_B"]).as_slice());
        assert_eq!(events[1].dropoffs(), package_ids(&problem, &["TO_C"]).as_slice());
        test_utils::assert_capacity_respected(&problem, &state);
    }

    #[test]
    fn test_same_station_package_is_logged_in_place() {
        let problem = test_utils::create_test_problem(
            &["A", "B"],
            &[("A", "B", 3)],
            &[("LOCAL", 2, "A", "A")],
            &[("T", 5, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["LOCAL"]))
            .unwrap();

        assert_eq!(outcome.delivered, package_ids(&problem, &["LOCAL"]));
        assert_eq!(state.events().len(), 1);
        assert!(state.events()[0].is_stationary());
        assert_eq!(state.events()[0].pickups(), state.events()[0].dropoffs());
        assert_eq!(state.time(), SignedDuration::ZERO);
        assert_eq!(state.load(), 0);
    }

    #[test]
    fn test_unreachable_pickup_is_skipped() {
        let problem = test_utils::create_test_problem(
            &["A", "B", "X", "Y"],
            &[("A", "B", 3), ("X", "Y", 3)],
            &[("OK", 1, "A", "B"), ("ISLAND", 1, "X", "Y")],
            &[("T", 5, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["OK", "ISLAND"]))
            .unwrap();

        assert_eq!(outcome.delivered, package_ids(&problem, &["OK"]));
        assert_eq!(outcome.undelivered, package_ids(&problem, &["ISLAND"]));
        assert_eq!(state.events().len(), 1);
    }

    #[test]
    fn test_unreachable_destination_is_not_picked_up() {
        let problem = test_utils::create_test_problem(
            &["A", "B", "Z"],
            &[("A", "B", 3)],
            &[("LOST", 1, "A", "Z")],
            &[("T", 5, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let outcome = executor
            .execute(&mut state, &package_ids(&problem, &["LOST"]))
            .unwrap();

        assert!(outcome.delivered.is_empty());
        assert_eq!(outcome.undelivered, package_ids(&problem, &["LOST"]));
        assert!(state.events().is_empty());
        assert_eq!(state.load(), 0);
    }

    #[test]
    fn test_estimate_matches_execution() {
        let problem = test_utils::create_test_problem(
            &["A", "B", "C", "D"],
            &[("A", "B", 5), ("B", "C", 1), ("C", "D", 1), ("A", "D", 9)],
            &[("P1", 1, "A", "C"), ("P2", 1, "D", "B"), ("P3", 2, "C", "A")],
            &[("T", 5, "B")],
        );
        let executor = RouteExecutor::new(&problem);
        let bundle = package_ids(&problem, &["P1", "P2", "P3"]);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let estimate = executor.estimate(state.station(), &bundle);
        executor.execute(&mut state, &bundle).unwrap();

        assert_eq!(estimate.travel_time, state.time());
        assert_eq!(estimate.final_station, state.station());
        assert!(estimate.unreachable.is_empty());
    }

    #[test]
    fn test_estimate_does_not_mutate() {
        let problem = test_utils::create_test_problem(
            &["A", "B"],
            &[("A", "B", 10)],
            &[("P", 5, "A", "B")],
            &[("T", 10, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let state = test_utils::create_vehicle_state(&problem, 0);

        let estimate = executor.estimate(state.station(), &package_ids(&problem, &["P"]));

        assert_eq!(estimate.travel_time, SignedDuration::from_mins(10));
        assert_eq!(estimate.final_station, station(&problem, "B"));
        assert_eq!(state.vehicle(), VehicleIdx::new(0));
        assert!(state.is_idle());
        assert_eq!(state.time(), SignedDuration::ZERO);
    }

    #[test]
    fn test_one_way_dead_end_package_is_never_picked_up() {
        // A -> B and A -> C only: once at B, C cannot be reached
        let problem = test_utils::create_problem_on(
            test_utils::create_one_way_graph(&["A", "B", "C"], &[("A", "B", 1), ("A", "C", 5)]),
            &[("P1", 1, "A", "B"), ("P2", 5, "A", "C")],
            &[("T", 10, "A")],
        );
        let executor = RouteExecutor::new(&problem);
        let bundle = package_ids(&problem, &["P1", "P2"]);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let estimate = executor.estimate(state.station(), &bundle);
        let outcome = executor.execute(&mut state, &bundle).unwrap();

        assert_eq!(estimate.unreachable, package_ids(&problem, &["P2"]));
        assert_eq!(outcome.delivered, package_ids(&problem, &["P1"]));
        assert_eq!(outcome.undelivered, package_ids(&problem, &["P2"]));

        assert_eq!(state.events().len(), 1);
        assert_eq!(state.events()[0].pickups(), package_ids(&problem, &["P1"]).as_slice());
        assert_eq!(state.events()[0].dropoffs(), package_ids(&problem, &["P1"]).as_slice());
        assert_eq!(state.load(), 0);
        assert_eq!(state.station(), station(&problem, "B"));
        assert_eq!(estimate.travel_time, state.time());
    }

    #[test]
    fn test_path_without_matching_edge_is_corrupted() {
        // The table routes A -> B through C, but the graph only links A and B
        let stations = ["A", "B", "C"];
        let detour = test_utils::create_graph(&stations, &[("A", "C", 1), ("C", "B", 1)]);
        let graph = test_utils::create_graph(&stations, &[("A", "B", 10)]);
        let station = |name: &str| graph.station_idx(name).unwrap();

        let mut builder = DeliveryProblemBuilder::new(graph.clone());
        builder
            .set_packages(vec![Package::new("P", 1, station("A"), station("B"))])
            .set_vehicles(vec![Vehicle::new("T", 5, station("A"))]);
        let problem = builder
            .build_with_shortest_paths(detour.compute_all_pairs())
            .unwrap();

        let executor = RouteExecutor::new(&problem);
        let mut state = test_utils::create_vehicle_state(&problem, 0);

        let result = executor.execute(&mut state, &package_ids(&problem, &["P"]));

        assert_eq!(
            result,
            Err(PlannerError::CorruptedPath {
                from: "A".to_owned(),
                to: "C".to_owned(),
            })
        );
    }
}

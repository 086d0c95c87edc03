use proptest::prelude::*;

use routing_sim::algorithms::{DistanceVector, LinkState, shortest_path_tree};
use routing_sim::{AlgorithmKind, Cost, Position, SimulationController, StepOutcome, Topology};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build(names: &[&str], links: &[(&str, &str, i64)]) -> Topology {
    let mut topo = Topology::new();
    for name in names {
        topo.add_router(name, Position::default());
    }
    for (a, b, cost) in links {
        topo.add_link(a, b, *cost).unwrap();
    }
    topo
}

prop_compose! {
    fn arb_topology()(n in 1usize..7)
        (n in Just(n), links in prop::collection::vec((0..n, 0..n, 0i64..20), 0..12))
        -> Topology
    {
        let mut topo = Topology::new();
        for i in 0..n {
            topo.add_router(&format!("R{}", i), Position::default());
        }
        for (a, b, cost) in links {
            if a != b {
                topo.add_link(&format!("R{}", a), &format!("R{}", b), cost).unwrap();
            }
        }
        topo
    }
}

proptest! {
    /// Converged distance vector costs match an independent Dijkstra from every router.
    #[test]
    fn distance_vector_agrees_with_dijkstra(mut topo in arb_topology()) {
        let reference = topo.clone();
        let mut dv = DistanceVector::new();
        prop_assert!(dv.run_until_convergence(&mut topo));

        for source in reference.routers() {
            let tree = shortest_path_tree(&reference, source.id());
            let table = topo.router(source.name()).unwrap().routing_table();
            for dest in reference.routers() {
                prop_assert_eq!(table.cost_to(dest.name()), tree.distance(dest.id()));
            }
        }
    }

    /// Both engines agree on every cost and on which routers are unreachable.
    #[test]
    fn engines_agree(topo in arb_topology()) {
        let mut by_dv = topo.clone();
        let mut by_ls = topo.clone();
        DistanceVector::new().run_until_convergence(&mut by_dv);
        LinkState::new().run_for_all_routers(&mut by_ls).unwrap();

        for router in topo.routers() {
            let dv = by_dv.router(router.name()).unwrap().routing_table();
            let ls = by_ls.router(router.name()).unwrap().routing_table();
            for dest in topo.routers() {
                prop_assert_eq!(dv.cost_to(dest.name()), ls.cost_to(dest.name()));
                if ls.cost_to(dest.name()).is_infinite() {
                    prop_assert_eq!(dv.next_hop(dest.name()), None);
                    prop_assert_eq!(ls.next_hop(dest.name()), None);
                }
            }
        }
    }

    #[test]
    fn reset_is_idempotent(mut topo in arb_topology()) {
        topo.reset_routing_tables();
        let first: Vec<_> = topo.routers().iter().map(|r| r.routing_table().clone()).collect();
        topo.reset_routing_tables();
        let second: Vec<_> = topo.routers().iter().map(|r| r.routing_table().clone()).collect();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn relinking_in_reverse_keeps_one_link() {
    let mut topo = build(&["A", "B"], &[("A", "B", 3)]);
    topo.add_link("B", "A", 8).unwrap();

    assert_eq!(topo.link_count(), 1);
    assert_eq!(topo.find_link("A", "B"), topo.find_link("B", "A"));
    assert_eq!(topo.find_link("B", "A").unwrap().cost(), 8);
    assert_eq!(topo.neighbors("A"), vec![("B", 8)]);
    assert_eq!(topo.neighbors("B"), vec![("A", 8)]);
}

#[test]
fn removing_a_router_drops_exactly_its_links() {
    let mut topo = build(
        &["A", "B", "C", "D"],
        &[("A", "B", 1), ("A", "C", 1), ("B", "C", 1), ("C", "D", 1)],
    );
    let before = topo.link_count();
    topo.remove_router("A");

    assert_eq!(topo.link_count(), before - 2);
    for router in topo.routers() {
        assert!(topo.neighbors(router.name()).iter().all(|(n, _)| *n != "A"));
    }
    assert!(topo.find_link("B", "C").is_some());
}

#[test]
fn line_distance_vector_tables() {
    init_logging();
    let topo = build(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1)]);
    let mut sim = SimulationController::new(topo);
    sim.start(AlgorithmKind::DistanceVector, None).unwrap();
    assert_eq!(sim.run_to_completion().unwrap(), StepOutcome::Converged);

    let a = sim.last_snapshot().unwrap().routers[0].clone();
    assert_eq!(a.router, "A");
    let costs = a.costs();
    let hops = a.next_hops();
    assert_eq!(costs["A"], Cost::Finite(0));
    assert_eq!(costs["B"], Cost::Finite(1));
    assert_eq!(costs["C"], Cost::Finite(2));
    assert_eq!(hops["A"], "A");
    assert_eq!(hops["B"], "B");
    assert_eq!(hops["C"], "B");
}

#[test]
fn isolated_routers_know_only_themselves() {
    init_logging();
    for algorithm in [AlgorithmKind::DistanceVector, AlgorithmKind::LinkState] {
        let mut sim = SimulationController::new(build(&["A", "B", "C"], &[]));
        sim.start(algorithm, None).unwrap();
        sim.run_to_completion().unwrap();

        for router in sim.topology().routers() {
            let table = router.routing_table();
            assert_eq!(table.cost_to(router.name()), Cost::ZERO);
            for (dest, entry) in table.iter() {
                if dest != router.name() {
                    assert_eq!(entry.cost, Cost::Infinite);
                    assert_eq!(entry.next_hop, None);
                }
            }
        }
    }
}

#[test]
fn triangle_link_state_from_a() {
    let mut topo = build(
        &["A", "B", "C"],
        &[("A", "B", 5), ("B", "C", 3), ("A", "C", 1)],
    );
    LinkState::new().run(&mut topo, "A").unwrap();

    let a = topo.router("A").unwrap().routing_table();
    assert_eq!(a.cost_to("C"), Cost::Finite(1));
    assert_eq!(a.next_hop("C"), Some("C"));
    assert_eq!(a.cost_to("B"), Cost::Finite(4));
    assert_eq!(a.next_hop("B"), Some("C"));
}

#[test]
fn oscillating_topology_terminates() {
    init_logging();
    let names = ["A", "B", "C", "D"];
    let topo = build(
        &names,
        &[("A", "B", -2), ("B", "C", 1), ("C", "D", 1), ("D", "A", 1)],
    );
    let mut sim = SimulationController::new(topo);
    sim.start(AlgorithmKind::DistanceVector, None).unwrap();

    assert_eq!(sim.run_to_completion().unwrap(), StepOutcome::Exhausted);
    let run = sim.run().unwrap();
    assert!(!run.converged);
    assert_eq!(run.max_iterations, 10 * names.len());
    assert_eq!(run.iteration, run.max_iterations);
}

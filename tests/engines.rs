#[cfg(test)]
mod tests {
    use quadlife::{
        generate_rle, get_bounds, load_macrocell, make_center, parse_rle, random_field,
        save_macrocell, ConfigSnapshot, NaiveLife, Rule, Universe,
    };

    const SEED: u64 = 42;

    fn randomly_filled(
        side: u32,
        seed: u64,
        rule: Rule,
        config: ConfigSnapshot,
    ) -> (Universe, NaiveLife) {
        let (mut xs, mut ys) = random_field(side, 0.4, Some(seed));
        let mut bounds = get_bounds(&xs, &ys);
        make_center(&mut xs, &mut ys, &mut bounds);
        let naive = NaiveLife::from_cells(xs.iter().copied().zip(ys.iter().copied()), rule);

        let mut universe = Universe::with_config(config);
        universe.set_rule(rule);
        universe.setup_field(&mut xs, &mut ys, Some(bounds));
        assert_cells_equal(&universe, &naive);
        (universe, naive)
    }

    fn assert_cells_equal(universe: &Universe, naive: &NaiveLife) {
        let mut actual = universe.live_cells();
        actual.sort_unstable();
        let expected = naive.get_cells();
        if actual == expected {
            return;
        }

        let (x, y) = actual
            .iter()
            .zip(expected.iter())
            .find(|(a, e)| a != e)
            .map(|(&a, &e)| a.min(e))
            .or_else(|| actual.get(expected.len()).copied())
            .or_else(|| expected.get(actual.len()).copied())
            .unwrap();
        const K: i64 = 10;
        let mut picture = String::new();
        for cy in y - K..y + K {
            picture.push('|');
            picture.extend(
                (x - K..x + K).map(|cx| if universe.get_bit(cx, cy) { '#' } else { ' ' }),
            );
            picture.push('|');
            picture.extend((x - K..x + K).map(|cx| if naive.get(cx, cy) { '#' } else { ' ' }));
            picture.push_str("|\n");
        }
        panic!(
            "Mismatch at ({}, {}) after generation {}:\n{}",
            x,
            y,
            universe.generation(),
            picture
        );
    }

    #[test]
    fn test_single_steps() {
        for step in 0..6 {
            let (mut universe, mut naive) =
                randomly_filled(32, SEED + step as u64, Rule::CONWAY, ConfigSnapshot::DEFAULT);
            universe.set_step(step);
            for _ in 0..3 {
                universe.next_generation(true);
                naive.update(1 << step);
                assert_cells_equal(&universe, &naive);
            }
            assert_eq!(universe.generation(), 3 << step);
        }
    }

    #[test]
    fn test_step_equivalence() {
        for n_log2 in [3, 5] {
            let (mut single, mut naive) =
                randomly_filled(20, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
            let (mut jump, _) = randomly_filled(20, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
            for _ in 0..1 << n_log2 {
                single.next_generation(true);
            }
            jump.set_step(n_log2);
            jump.next_generation(true);
            naive.update(1 << n_log2);
            assert_eq!(single.generation(), jump.generation());
            assert_cells_equal(&single, &naive);
            assert_cells_equal(&jump, &naive);
        }
    }

    #[test]
    fn test_bulk_steps() {
        let (mut universe, mut naive) =
            randomly_filled(24, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
        for _ in 0..2 {
            let before = universe.generation();
            universe.next_generation(false);
            let delta = universe.generation() - before;
            assert!(delta >= 1 << (universe.root_level() - 3));
            naive.update(delta);
            assert_cells_equal(&universe, &naive);
        }
    }

    #[test]
    fn test_other_rule() {
        let highlife = Rule::parse("B36/S23").unwrap();
        let (mut universe, mut naive) =
            randomly_filled(32, SEED, highlife, ConfigSnapshot::DEFAULT);
        universe.set_step(2);
        for _ in 0..5 {
            universe.next_generation(true);
            naive.update(4);
        }
        assert_cells_equal(&universe, &naive);
    }

    #[test]
    fn test_light_speed_bulk_steps() {
        for (rule, cells) in [
            ("B2/S", vec![(0, 0), (1, 0)]),
            ("B1/S", vec![(0, 0)]),
            ("B25/S4", vec![(0, 0), (1, 0), (5, 3)]),
        ] {
            let rule = Rule::parse(rule).unwrap();
            let mut naive = NaiveLife::from_cells(cells.iter().copied(), rule);
            let mut universe = Universe::new();
            universe.set_rule(rule);
            for &(x, y) in cells.iter() {
                universe.set_bit(x, y, true);
            }
            for _ in 0..3 {
                let before = universe.generation();
                universe.next_generation(false);
                naive.update(universe.generation() - before);
                assert_cells_equal(&universe, &naive);
            }
        }
    }

    #[test]
    fn test_collections_keep_results() {
        let config = ConfigSnapshot {
            memory_manager_cap_log2: 8,
            memory_manager_max_cap_log2: 12,
            gc_load_factor_percent: 50,
        };
        let (mut universe, mut naive) = randomly_filled(32, SEED, Rule::CONWAY, config);
        universe.set_step(3);
        for _ in 0..8 {
            universe.next_generation(true);
            naive.update(8);
            assert_cells_equal(&universe, &naive);
        }
        assert!(universe.memory().gc_runs > 0);
        assert!(universe.memory().capacity() <= 1 << 12);
    }

    #[test]
    fn test_glider_moves() {
        let mut universe = Universe::new();
        let glider = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
        for (x, y) in glider {
            universe.set_bit(x, y, true);
        }
        universe.set_step(2);
        universe.next_generation(true);
        assert_eq!(universe.generation(), 4);
        let mut cells = universe.live_cells();
        cells.sort_unstable();
        let mut expected = glider.map(|(x, y)| (x + 1, y + 1)).to_vec();
        expected.sort_unstable();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_blinker() {
        let mut universe = Universe::new();
        for x in -1..=1 {
            universe.set_bit(x, 0, true);
        }
        universe.next_generation(true);
        assert!(universe.get_bit(0, -1) && universe.get_bit(0, 0) && universe.get_bit(0, 1));
        assert_eq!(universe.population(), 3);
        universe.next_generation(true);
        assert!(universe.get_bit(-1, 0) && universe.get_bit(0, 0) && universe.get_bit(1, 0));
        assert_eq!(universe.generation(), 2);
    }

    #[test]
    fn test_empty_universe() {
        let mut universe = Universe::new();
        universe.set_step(4);
        universe.next_generation(true);
        universe.next_generation(false);
        assert_eq!(universe.population(), 0);
        assert!(universe.generation() >= 16);
        assert_eq!(universe.get_root_bounds(), quadlife::Bounds::default());
    }

    #[test]
    fn test_rle_round_trip() {
        let (universe, _) = randomly_filled(40, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
        let rle = generate_rle(&universe, Some("soup"), &["random", "40 by 40"]);
        let pattern = parse_rle(&rle).unwrap();
        assert_eq!(pattern.title.as_deref(), Some("soup"));
        assert_eq!(pattern.comment, "random\n40 by 40");
        assert_eq!(pattern.rule, Some(Rule::CONWAY));

        let bounds = universe.get_root_bounds();
        assert_eq!(pattern.width, Some(bounds.width()));
        assert_eq!(pattern.height, Some(bounds.height()));
        let mut parsed = pattern
            .field_x
            .iter()
            .zip(pattern.field_y.iter())
            .map(|(&x, &y)| (x + bounds.left, y + bounds.top))
            .collect::<Vec<_>>();
        parsed.sort_unstable();
        let mut cells = universe.live_cells();
        cells.sort_unstable();
        assert_eq!(parsed, cells);
    }

    #[test]
    fn test_canonical_form() {
        let (mut xs, mut ys) = random_field(64, 0.3, Some(SEED));
        let mut a = Universe::new();
        a.setup_field(&mut xs.clone(), &mut ys.clone(), None);

        xs.reverse();
        ys.reverse();
        let half = xs.len() / 2;
        xs.rotate_left(half);
        ys.rotate_left(half);
        let mut b = Universe::new();
        b.setup_field(&mut xs, &mut ys, None);

        a.run_gc();
        b.run_gc();
        assert_eq!(a.memory().len(), b.memory().len());
        assert_eq!(a.memory().nodes(), b.memory().nodes());
    }

    #[test]
    fn test_rewind_after_evolution() {
        let (mut universe, naive) =
            randomly_filled(16, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
        universe.save_rewind_state();
        universe.set_step(5);
        universe.next_generation(true);
        universe.run_gc();
        assert_eq!(universe.generation(), 32);
        assert!(universe.restore_rewind_state());
        assert_eq!(universe.generation(), 0);
        assert_cells_equal(&universe, &naive);
    }

    #[test]
    fn test_macrocell_round_trip() {
        let (mut universe, mut naive) =
            randomly_filled(32, SEED, Rule::CONWAY, ConfigSnapshot::DEFAULT);
        let text = save_macrocell(&universe).unwrap();
        let mut loaded = Universe::new();
        load_macrocell(&mut loaded, &text).unwrap();
        assert_cells_equal(&loaded, &naive);

        universe.set_step(4);
        universe.next_generation(true);
        loaded.set_step(4);
        loaded.next_generation(true);
        naive.update(16);
        assert_cells_equal(&universe, &naive);
        assert_cells_equal(&loaded, &naive);
    }
}

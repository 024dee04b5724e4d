use parmat::{Config, Dispatcher, Matrix, ParmatErrorKind, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn parallel() -> Dispatcher {
    Dispatcher::new(Config::default().with_threads(4).with_limit(7)).unwrap()
}

fn random_ints(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix<i64> {
    Matrix::from_fn(rows, cols, |_, _| rng.gen_range(-50, 50))
}

fn random_floats(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix<f64> {
    Matrix::from_fn(rows, cols, |_, _| rng.gen_range(-1.0, 1.0))
}

#[test]
fn elementwise_ops_match_sequential() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let sequential = Dispatcher::sequential();
    let parallel = parallel();

    for &(rows, cols) in &[(1, 1), (3, 5), (40, 25), (97, 101)] {
        let a = random_floats(&mut rng, rows, cols);
        let b = random_floats(&mut rng, rows, cols);

        assert_eq!(a.add(&b, &sequential)?, a.add(&b, &parallel)?);
        assert_eq!(a.sub(&b, &sequential)?, a.sub(&b, &parallel)?);
        assert_eq!(a.hadamard(&b, &sequential)?, a.hadamard(&b, &parallel)?);
        assert_eq!(a.scale(0.5, &sequential)?, a.scale(0.5, &parallel)?);
        assert_eq!(a.pow_elem(3, &sequential)?, a.pow_elem(3, &parallel)?);
        assert_eq!(a.transpose(&sequential)?, a.transpose(&parallel)?);
    }
    Ok(())
}

#[test]
fn matmul_matches_sequential() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let sequential = Dispatcher::sequential();
    let parallel = parallel();

    let a = random_floats(&mut rng, 37, 53);
    let b = random_floats(&mut rng, 53, 29);
    let product = a.matmul(&b, &parallel)?;
    assert_eq!((37, 29), product.shape());
    assert_eq!(a.matmul(&b, &sequential)?, product);

    let square = random_ints(&mut rng, 30, 30);
    assert_eq!(square.pow(5, &sequential)?, square.pow(5, &parallel)?);
    Ok(())
}

#[test]
fn known_values() -> Result<()> {
    let dispatcher = Dispatcher::new(Config::default().with_threads(2).with_limit(1))?;
    let a = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6])?;
    let b = Matrix::from_vec(3, 2, vec![7, 8, 9, 10, 11, 12])?;

    assert_eq!(&[58, 64, 139, 154], a.matmul(&b, &dispatcher)?.as_slice());
    assert_eq!(&[1, 4, 2, 5, 3, 6], a.transpose(&dispatcher)?.as_slice());
    assert_eq!(&[1, 4, 9, 16, 25, 36], a.pow_elem(2, &dispatcher)?.as_slice());
    assert_eq!(&[1, 1, 1, 1, 1, 1], a.pow_elem(0, &dispatcher)?.as_slice());
    assert_eq!(&[3, 6, 9, 12, 15, 18], a.scale(3, &dispatcher)?.as_slice());
    assert_eq!(6, a[(1, 2)]);
    assert_eq!(None, a.get(2, 0));

    // fibonacci through powers of [[1, 1], [1, 0]]
    let fib = Matrix::from_vec(2, 2, vec![1u64, 1, 1, 0])?;
    assert_eq!(Some(6765), fib.pow(20, &dispatcher)?.get(0, 1));
    assert_eq!(Matrix::identity(2), fib.pow(0, &dispatcher)?);
    Ok(())
}

#[test]
fn in_place_ops() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let dispatcher = parallel();
    let a = random_ints(&mut rng, 50, 50);
    let b = random_ints(&mut rng, 50, 50);

    let mut c = a.clone();
    c.add_assign(&b, &dispatcher)?;
    assert_eq!(a.add(&b, &dispatcher)?, c);

    c.sub_assign(&b, &dispatcher)?;
    assert_eq!(a, c);
    Ok(())
}

#[test]
fn shape_errors() -> Result<()> {
    let dispatcher = parallel();
    let a = Matrix::<i32>::new(2, 3);
    let b = Matrix::<i32>::new(3, 2);

    assert_eq!(ParmatErrorKind::ShapeMismatch, a.add(&b, &dispatcher).unwrap_err().kind());
    assert_eq!(ParmatErrorKind::ShapeMismatch, a.matmul(&a, &dispatcher).unwrap_err().kind());
    assert_eq!(ParmatErrorKind::ShapeMismatch, a.all_lt(&b, &dispatcher).unwrap_err().kind());
    assert_eq!(ParmatErrorKind::ShapeMismatch, a.all_gt(&b, &dispatcher).unwrap_err().kind());
    assert_eq!(ParmatErrorKind::NotSquare, a.pow(2, &dispatcher).unwrap_err().kind());
    assert_eq!(
        ParmatErrorKind::ShapeMismatch,
        Matrix::from_vec(2, 2, vec![1, 2, 3]).unwrap_err().kind()
    );

    let mut c = a.clone();
    assert_eq!(ParmatErrorKind::ShapeMismatch, c.add_assign(&b, &dispatcher).unwrap_err().kind());
    Ok(())
}

#[test]
fn comparisons() -> Result<()> {
    let dispatcher = Dispatcher::new(Config::default().with_threads(3).with_limit(5).with_epsilon(1e-6))?;
    let a = Matrix::from_fn(20, 20, |row, col| (row * 20 + col) as f64);
    let nudged = Matrix::from_fn(20, 20, |row, col| (row * 20 + col) as f64 + 1e-9);
    let shifted = Matrix::from_fn(20, 20, |row, col| (row * 20 + col) as f64 + 1.0);

    assert!(a.approx_eq(&nudged, &dispatcher)?);
    assert!(!a.approx_eq(&shifted, &dispatcher)?);
    assert!(!a.approx_eq(&Matrix::new(20, 19), &dispatcher)?);

    dispatcher.configure(dispatcher.config().with_epsilon(1e-12))?;
    assert!(!a.approx_eq(&nudged, &dispatcher)?);
    dispatcher.configure(dispatcher.config().with_epsilon(1e-6))?;

    assert!(a.all_lt(&shifted, &dispatcher)?);
    assert!(!a.all_lt(&a, &dispatcher)?);
    assert!(shifted.all_gt(&a, &dispatcher)?);
    assert!(!a.all_gt(&shifted, &dispatcher)?);
    Ok(())
}

#[test]
fn symmetry() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let dispatcher = parallel();

    let a = random_floats(&mut rng, 60, 60);
    let symmetric = a.add(&a.transpose(&dispatcher)?, &dispatcher)?;
    assert!(symmetric.is_symmetric(&dispatcher)?);
    assert!(!a.is_symmetric(&dispatcher)?);

    assert!(Matrix::diagonal(&[1, 2, 3]).is_symmetric(&dispatcher)?);
    assert!(!Matrix::<i32>::new(2, 3).is_symmetric(&dispatcher)?);
    assert!(Matrix::<i32>::new(0, 0).is_symmetric(&dispatcher)?);
    Ok(())
}

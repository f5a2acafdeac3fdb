#![allow(non_snake_case)]
use crate::algebra::*;

fn test_matrix_3x4() -> SparseMatrix {
    // A =
    //[-1.0  -17.0  6.0  10.0]
    //[ 3.0     ⋅   7.0    ⋅ ]
    //[  ⋅    -4.0   ⋅   -5.0]
    let Ap = vec![0, 2, 4, 6, 8];
    let Ai = vec![0, 1, 0, 2, 0, 1, 0, 2];
    let Ax = vec![-1., 3., -17., -4., 6., 7., 10., -5.];
    SparseMatrix::from_colptr(3, 4, Ap, Ai, Ax)
}

fn test_matrix_3x3_gaps() -> SparseMatrix {
    // A =
    //[ 2.0    ⋅   1.0]
    //[  ⋅   -1.0   ⋅ ]
    //[ 4.0    ⋅   3.0]
    //
    // unused slots between columns, rows unsorted
    let start = vec![0, 3, 5];
    let count = vec![2, 1, 2];
    let rows = vec![2, 0, 99, 1, 99, 0, 2];
    let vals = vec![4., 2., 0., -1., 0., 1., 3.];
    SparseMatrix::new(3, 3, start, count, rows, vals)
}

#[test]
fn test_size_nnz() {
    let A = test_matrix_3x4();
    assert_eq!(A.size(), (3, 4));
    assert_eq!(A.nnz(), 8);

    let B = test_matrix_3x3_gaps();
    assert_eq!(B.nnz(), 5);
    assert_eq!(B.row_index.len(), 7);
}

#[test]
fn test_check_format() {
    assert!(test_matrix_3x4().check_format().is_ok());
    assert!(test_matrix_3x3_gaps().check_format().is_ok());

    let mut A = test_matrix_3x4();
    A.row_index[3] = 3;
    assert_eq!(A.check_format(), Err(SparseFormatError::BadRowIndex(1)));

    let mut A = test_matrix_3x4();
    A.column_start = vec![0, 4, 2, 6];
    assert_eq!(A.check_format(), Err(SparseFormatError::BadColumnStart));

    let mut A = test_matrix_3x4();
    A.column_count[0] = 3;
    assert_eq!(A.check_format(), Err(SparseFormatError::OverlappingColumns(0)));

    let mut A = test_matrix_3x4();
    A.column_count[3] = 3;
    assert_eq!(A.check_format(), Err(SparseFormatError::BadColumnStart));

    let mut A = test_matrix_3x4();
    A.row_index[1] = 0;
    assert_eq!(
        A.check_format(),
        Err(SparseFormatError::DuplicateEntry { row: 0, col: 0 })
    );

    let mut A = test_matrix_3x4();
    A.value[2] = f64::NAN;
    assert_eq!(A.check_format(), Err(SparseFormatError::NonFiniteValue(1)));

    let mut A = test_matrix_3x4();
    A.column_count.pop();
    assert_eq!(
        A.check_format(),
        Err(SparseFormatError::IncompatibleDimension)
    );
}

#[test]
fn test_to_colptr_compacts_and_sorts() {
    let B = test_matrix_3x3_gaps();
    let (colptr, rowval, nzval) = B.to_colptr();
    assert_eq!(colptr, vec![0, 2, 3, 5]);
    assert_eq!(rowval, vec![0, 2, 1, 0, 2]);
    assert_eq!(nzval, vec![2., 4., -1., 1., 3.]);
}

#[test]
fn test_from_triplets() {
    let A = SparseMatrix::from_triplets(
        2,
        3,
        &[(1, 2, 5.), (0, 0, 1.), (1, 0, 2.), (1, 2, 1.), (0, 1, -3.)],
    );
    assert!(A.check_format().is_ok());
    assert_eq!(A.nnz(), 4);
    assert_eq!(A.get_entry((0, 0)), Some(1.));
    assert_eq!(A.get_entry((1, 0)), Some(2.));
    assert_eq!(A.get_entry((0, 1)), Some(-3.));
    assert_eq!(A.get_entry((1, 2)), Some(6.));
    assert_eq!(A.get_entry((0, 2)), None);
}

#[test]
fn test_transpose() {
    let A = test_matrix_3x4();
    let At = A.transpose();
    assert_eq!(At.size(), (4, 3));
    assert!(At.check_format().is_ok());
    for (row, col, v) in A.triplets() {
        assert_eq!(At.get_entry((col, row)), Some(v));
    }
    assert_eq!(At.transpose(), A);
}

#[test]
fn test_triangles_and_symmetry() {
    // Q =
    //[ 2.0  1.0   ⋅ ]
    //[ 1.0  4.0  -1.0]
    //[  ⋅  -1.0   3.0]
    let Q = SparseMatrix::from_triplets(
        3,
        3,
        &[
            (0, 0, 2.),
            (1, 0, 1.),
            (0, 1, 1.),
            (1, 1, 4.),
            (2, 1, -1.),
            (1, 2, -1.),
            (2, 2, 3.),
        ],
    );
    assert!(Q.is_symmetric(0.));

    let U = Q.upper_triangle();
    assert_eq!(U.nnz(), 5);
    assert!(U.triplets().all(|(r, c, _)| r <= c));
    assert!(!U.is_symmetric(0.));

    assert_eq!(U.symmetrize_upper(), Q);

    let mut Qbad = Q.clone();
    Qbad.value[1] = 1.5;
    assert!(!Qbad.is_symmetric(1e-12));
    assert!(Qbad.is_symmetric(0.6));
}

#[test]
fn test_mul_vec_and_quad_form() {
    let A = test_matrix_3x4();
    let x = [1., 2., 3., 4.];
    let mut y = [0.; 3];
    A.mul_vec(&mut y, &x);
    assert_eq!(y, [-1. - 34. + 18. + 40., 3. + 21., -8. - 20.]);

    let Q = SparseMatrix::identity(4);
    assert_eq!(Q.quad_form(&x), 30.);
}

macro_rules! assert_socks5_err {
    ($expected:expr, $result:expr) => {
        assert_eq!($expected, $result.downcast::<Socks5Error>().expect("Socks5 error type expected"))
    };
}

macro_rules! bail_unless_socks5_err {
    ($expected_socks5_err:expr, $actual:expr) => {
        match $actual {
            Err(err) => assert_socks5_err!($expected_socks5_err, err),
            Ok(ok) => panic!("Should fail with error {:}, instead returned {:#?}", $expected_socks5_err, ok),
        }
    };
}

#[allow(unused_imports)]
pub(crate) use assert_socks5_err;
#[allow(unused_imports)]
pub(crate) use bail_unless_socks5_err;

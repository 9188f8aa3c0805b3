use ipnetwork::IpNetwork;

const OPT_TYPE: u16 = 41;
const EDNS_UDP_PAYLOAD: u16 = 1232;
const OPTION_CLIENT_SUBNET: u16 = 8;

/// EDNS0 OPT record (RFC 6891) carrying a client-subnet option (RFC 7871).
///
/// Only the significant bytes of the prefix are sent; scope is always 0.
pub fn encode_client_subnet_opt(subnet: IpNetwork) -> Vec<u8> {
    let prefix = subnet.prefix();
    let (family, octets): (u16, Vec<u8>) = match subnet {
        IpNetwork::V4(net) => (1, net.network().octets().to_vec()),
        IpNetwork::V6(net) => (2, net.network().octets().to_vec()),
    };
    let significant = usize::from(prefix).div_ceil(8);

    let mut option = Vec::with_capacity(4 + significant);
    option.extend_from_slice(&family.to_be_bytes());
    option.push(prefix);
    option.push(0);
    option.extend_from_slice(&octets[..significant]);

    let rdata_len = 4 + option.len() as u16;
    let mut opt = Vec::with_capacity(11 + usize::from(rdata_len));
    opt.push(0);
    opt.extend_from_slice(&OPT_TYPE.to_be_bytes());
    opt.extend_from_slice(&EDNS_UDP_PAYLOAD.to_be_bytes());
    opt.extend_from_slice(&[0, 0, 0, 0]);
    opt.extend_from_slice(&rdata_len.to_be_bytes());
    opt.extend_from_slice(&OPTION_CLIENT_SUBNET.to_be_bytes());
    opt.extend_from_slice(&(option.len() as u16).to_be_bytes());
    opt.extend_from_slice(&option);
    opt
}

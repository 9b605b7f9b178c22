/// Port assigned to the first prototype of the input file.
pub const PORT_NUMBER_START: u16 = 0x510;
pub const PORT_PREFIX: &str = "UHYVE_PORT_";
pub const PORT_ENUM_NAME: &str = "uhyve_ibv_t";

pub const PROTOTYPES_PATH: &str = "function-prototypes-0.txt";

pub const IBV_GEN_PATH: &str = "GEN-kernel-ibv.c";
pub const UHYVE_HOST_FCNS_GEN_PATH: &str = "GEN-tools-uhyve-ibv.c";
pub const UHYVE_IBV_HEADER_GEN_PATH: &str = "GEN-tools-uhyve-ibv-ports.h";
pub const INCLUDE_STDDEF_GEN_PATH: &str = "GEN-include-hermit-stddef.h";
pub const UHYVE_IBV_HEADER_STRUCTS_GEN_PATH: &str = "GEN-tools-uhyve-ibv-structs.h";
pub const UHYVE_CASES_GEN_PATH: &str = "GEN-tools-uhyve.c";

/// Name of the local marshalling record in guest stubs.
pub const GUEST_ARGS: &str = "uhyve_args";
/// Name of the record pointer in host dispatchers.
pub const HOST_ARGS: &str = "args";
/// Name of the host-side return value in host dispatchers.
pub const HOST_RET: &str = "host_ret";
/// Name of the return value field in every marshalling record.
pub const RET_FIELD: &str = "ret";

pub const GUEST_SEND_FN: &str = "uhyve_send";
pub const GUEST_VIRT_TO_PHYS_FN: &str = "virt_to_phys";
pub const GUEST_ALLOC_FN: &str = "kmalloc";
pub const HOST_GUEST_MEM: &str = "guest_mem";
pub const HOST_KVM_RUN: &str = "run";
/// Name of the guest physical address of the record in host dispatchers.
pub const HOST_DATA: &str = "data";
pub const HOST_COPY_FN: &str = "memcpy";

/// Parameter names that clash with a record field, a guest stub local or a
/// function the guest stub calls.
pub const RESERVED_PARAM_NAMES: [&str; 5] = [
	RET_FIELD,
	GUEST_ARGS,
	GUEST_SEND_FN,
	GUEST_VIRT_TO_PHYS_FN,
	GUEST_ALLOC_FN,
];

/// Function names that would be shadowed inside their host dispatcher or that
/// the generated code already calls.
pub const RESERVED_FUNCTION_NAMES: [&str; 9] = [
	HOST_ARGS,
	HOST_RET,
	HOST_DATA,
	HOST_KVM_RUN,
	HOST_GUEST_MEM,
	HOST_COPY_FN,
	GUEST_SEND_FN,
	GUEST_VIRT_TO_PHYS_FN,
	GUEST_ALLOC_FN,
];
